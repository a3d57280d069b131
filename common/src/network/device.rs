//! # Discovered Devices
//!
//! Records produced by WS-Discovery and the address-keyed set they are collected into.

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// A device that answered a discovery probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub addr: Ipv4Addr,
    /// Name of the local interface the response arrived on.
    pub interface: String,
    /// Service endpoints advertised in the ProbeMatch, in the order given.
    pub xaddrs: Vec<String>,
    pub scopes: Vec<String>,
}

impl DiscoveredDevice {
    pub fn new(addr: Ipv4Addr, interface: impl Into<String>) -> Self {
        Self {
            addr,
            interface: interface.into(),
            xaddrs: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn with_xaddrs(mut self, xaddrs: Vec<String>) -> Self {
        self.xaddrs = xaddrs;
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// First advertised endpoint whose host is the address that answered the probe.
    ///
    /// Endpoints naming any other host, hostnames included, are never used.
    pub fn device_service_url(&self) -> Option<&str> {
        self.xaddrs
            .iter()
            .find(|xaddr| xaddr_host(xaddr) == Some(self.addr))
            .map(String::as_str)
    }

    /// Endpoint negotiation should use: the matching advertised endpoint, else the bare address.
    pub fn negotiation_endpoint(&self) -> String {
        self.device_service_url()
            .map(str::to_string)
            .unwrap_or_else(|| self.addr.to_string())
    }

    /// Value of the `onvif://www.onvif.org/name/` scope, percent-encoded spaces decoded.
    pub fn scope_name(&self) -> Option<String> {
        self.scopes.iter().find_map(|scope| {
            scope
                .strip_prefix("onvif://www.onvif.org/name/")
                .map(|name| name.replace("%20", " "))
        })
    }
}

fn xaddr_host(xaddr: &str) -> Option<Ipv4Addr> {
    let rest = xaddr.split_once("://").map_or(xaddr, |(_, rest)| rest);
    let authority = rest.split('/').next()?;
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next()?.parse().ok()
}

/// Devices keyed by address; the first sighting wins and later ones are no-ops.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct DeviceSet {
    order: Vec<Ipv4Addr>,
    devices: HashMap<Ipv4Addr, DiscoveredDevice>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the address was not yet present.
    pub fn insert(&mut self, device: DiscoveredDevice) -> bool {
        if self.devices.contains_key(&device.addr) {
            return false;
        }
        self.order.push(device.addr);
        self.devices.insert(device.addr, device);
        true
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.devices.contains_key(addr)
    }

    pub fn get(&self, addr: &Ipv4Addr) -> Option<&DiscoveredDevice> {
        self.devices.get(addr)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredDevice> {
        self.order.iter().filter_map(|addr| self.devices.get(addr))
    }

    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.order.iter().copied()
    }
}

impl IntoIterator for DeviceSet {
    type Item = DiscoveredDevice;
    type IntoIter = std::vec::IntoIter<DiscoveredDevice>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.order
            .iter()
            .filter_map(|addr| self.devices.remove(addr))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl FromIterator<DiscoveredDevice> for DeviceSet {
    fn from_iter<T: IntoIterator<Item = DiscoveredDevice>>(iter: T) -> Self {
        let mut set = DeviceSet::new();
        for device in iter {
            set.insert(device);
        }
        set
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
