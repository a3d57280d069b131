use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4 address together with the local interface it was enumerated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkAddress {
    ip: Ipv4Addr,
    interface: String,
    index: u32,
}

impl NetworkAddress {
    pub fn new(ip: Ipv4Addr, interface: impl Into<String>, index: u32) -> Self {
        Self {
            ip,
            interface: interface.into(),
            index,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ip, self.interface)
    }
}
