use std::time::Duration;

use colored::*;
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;

use camscout_common::network::device::DiscoveredDevice;
use camscout_core::orchestrator::CameraReport;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn elapsed(duration: Duration) -> ColoredString {
    format!("{:.2}s", duration.as_secs_f64()).bold().yellow()
}

/// Advertised device name, falling back to its address.
pub fn device_title(device: &DiscoveredDevice) -> String {
    device.scope_name().unwrap_or_else(|| device.addr.to_string())
}

pub fn device_details(device: &DiscoveredDevice) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), device.addr.to_string().color(colors::IPV4_ADDR)),
        ("Iface".to_string(), device.interface.as_str().normal()),
    ];
    if let Some(xaddr) = device.device_service_url() {
        details.push(("XAddr".to_string(), xaddr.normal()));
    }
    details
}

pub fn camera_details<S>(report: &CameraReport<S>) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(identity) = report.camera.identity() {
        details.push(("Vendor".to_string(), identity.manufacturer.as_str().normal()));
        details.push(("Model".to_string(), identity.model.as_str().normal()));
        if !identity.serial_number.is_empty() {
            details.push(("Serial".to_string(), identity.serial_number.as_str().normal()));
        }
        if let Some(firmware) = &identity.firmware_version {
            details.push(("Fw".to_string(), firmware.as_str().normal()));
        }
    }

    match &report.result {
        Ok(uri) => details.push(("Stream".to_string(), uri.as_str().color(colors::STREAM_URI))),
        Err(e) => details.push(("Error".to_string(), e.to_string().color(colors::FAILURE))),
    }
    details
}

pub fn interface_details(interface: &NetworkInterface) -> Vec<Detail> {
    let mut details: Vec<Detail> = interface
        .ips
        .iter()
        .filter_map(|network| match network {
            IpNetwork::V4(ipv4_network) => {
                let address: ColoredString = ipv4_network.ip().to_string().color(colors::IPV4_ADDR);
                let prefix: ColoredString =
                    ipv4_network.prefix().to_string().color(colors::IPV4_PREFIX);
                let value: ColoredString = format!("{address}/{prefix}").color(colors::SEPARATOR);
                Some(("IPv4".to_string(), value))
            }
            IpNetwork::V6(_) => None,
        })
        .collect();

    if let Some(mac_addr) = interface.mac {
        details.push(("MAC".to_string(), mac_addr.to_string().color(colors::MAC_ADDR)));
    }

    let state: ColoredString = if interface.is_up() {
        "up".green()
    } else {
        "down".red()
    };
    details.push(("State".to_string(), state));
    details
}
