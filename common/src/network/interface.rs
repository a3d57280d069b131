//! # Interface Enumeration
//!
//! Lists the local IPv4 addresses a discovery probe can be sent from.
//!
//! Loopback and down interfaces are skipped, as are IPv6 addresses: WS-Discovery is only run
//! over the IPv4 multicast group.

use pnet::datalink::{self, NetworkInterface};
use tracing::{debug, warn};

use crate::error::EnumerationError;
use crate::network::address::NetworkAddress;
use crate::utils::interface::NetworkInterfaceExtension;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// The interface is a loopback device.
    IsLoopback,
    /// The interface has no IPv4 address to send a probe from.
    NoIpv4Address,
}

/// Every usable address on this host.
///
/// An enumeration failure is logged and yields an empty sequence.
pub fn local_addresses() -> impl Iterator<Item = NetworkAddress> {
    let interfaces: Vec<NetworkInterface> = match list_interfaces() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            warn!("Interface enumeration failed: {e}");
            Vec::new()
        }
    };
    usable_addresses(interfaces)
}

/// Usable addresses of the named interface only.
pub fn addresses_of(name: &str) -> Result<Vec<NetworkAddress>, EnumerationError> {
    let addresses: Vec<NetworkAddress> = usable_addresses(list_interfaces()?)
        .filter(|addr| addr.interface() == name)
        .collect();

    if addresses.is_empty() {
        return Err(EnumerationError::UnknownInterface(name.to_string()));
    }
    Ok(addresses)
}

pub fn list_interfaces() -> Result<Vec<NetworkInterface>, EnumerationError> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    if interfaces.is_empty() {
        return Err(EnumerationError::NoInterfaces);
    }
    Ok(interfaces)
}

/// Lazily expands viable interfaces into one [`NetworkAddress`] per IPv4 address.
pub fn usable_addresses(
    interfaces: Vec<NetworkInterface>,
) -> impl Iterator<Item = NetworkAddress> {
    interfaces
        .into_iter()
        .filter(|interface| match is_viable_discovery_interface(interface) {
            Ok(()) => true,
            Err(reason) => {
                debug!("Skipping interface {}: {:?}", interface.name, reason);
                false
            }
        })
        .flat_map(|interface| {
            let name: String = interface.name.clone();
            let index: u32 = interface.index;
            interface
                .get_ipv4_addrs()
                .into_iter()
                .map(move |ip| NetworkAddress::new(ip, name.clone(), index))
        })
}

fn is_viable_discovery_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if !interface.has_ipv4() {
        return Err(ViabilityError::NoIpv4Address);
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
