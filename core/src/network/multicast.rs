//! WS-Discovery multicast socket bound to a single local address.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use camscout_protocols::wsdiscovery::{ProbeMessage, WS_DISCOVERY_GROUP, WS_DISCOVERY_PORT, WS_DISCOVERY_TARGET};

use crate::discovery::ProbeTransport;

/// A UDP socket that has joined the WS-Discovery group on one interface.
///
/// The membership is dropped together with the socket.
pub struct MulticastSocket {
    socket: UdpSocket,
    interface: Ipv4Addr,
}

impl MulticastSocket {
    /// Must be called from within a Tokio runtime.
    pub fn open(interface: Ipv4Addr) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SocketAddrV4::new(interface, WS_DISCOVERY_PORT).into())?;
        socket.join_multicast_v4(&WS_DISCOVERY_GROUP, &interface)?;
        socket.set_multicast_if_v4(&interface)?;
        socket.set_multicast_loop_v4(false)?;
        socket.set_multicast_ttl_v4(1)?;
        socket.set_nonblocking(true)?;

        let socket: UdpSocket = UdpSocket::from_std(socket.into())?;
        debug!("Joined {WS_DISCOVERY_GROUP} on {interface}");
        Ok(Self { socket, interface })
    }
}

#[async_trait]
impl ProbeTransport for MulticastSocket {
    async fn send_probe(&mut self, probe: &ProbeMessage) -> io::Result<()> {
        let sent: usize = self.socket.send_to(probe.payload(), WS_DISCOVERY_TARGET).await?;
        trace!("Sent {sent} byte probe {} from {}", probe.message_id(), self.interface);
        Ok(())
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }
}

impl Drop for MulticastSocket {
    fn drop(&mut self) {
        if let Err(e) = self.socket.leave_multicast_v4(WS_DISCOVERY_GROUP, self.interface) {
            debug!("Leaving {WS_DISCOVERY_GROUP} on {} failed: {e}", self.interface);
        }
    }
}
