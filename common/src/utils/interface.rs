use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;

pub trait NetworkInterfaceExtension {
    /// Non-loopback IPv4 addresses assigned to the interface, in assignment order.
    fn get_ipv4_addrs(&self) -> Vec<Ipv4Addr>;
    fn has_ipv4(&self) -> bool;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) if !ipv4.ip().is_loopback() => Some(ipv4.ip()),
                _ => None,
            })
            .collect()
    }

    fn has_ipv4(&self) -> bool {
        !self.get_ipv4_addrs().is_empty()
    }
}
