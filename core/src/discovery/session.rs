//! A single WS-Discovery probe/collect cycle on one local address.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use camscout_common::config::{Config, DEFAULT_DISCOVERY_CAP, DEFAULT_SILENCE_WINDOW};
use camscout_common::network::{address::NetworkAddress, device::DeviceSet, device::DiscoveredDevice};
use camscout_protocols::wsdiscovery::{self, ProbeMatch, ProbeMessage};

use super::ProbeTransport;
use crate::error::{DiscoveryError, SocketStage};

const RECV_BUFFER_SIZE: usize = 65_535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub silence_window: Duration,
    pub cap: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            silence_window: DEFAULT_SILENCE_WINDOW,
            cap: DEFAULT_DISCOVERY_CAP,
        }
    }
}

impl From<&Config> for SessionTiming {
    fn from(config: &Config) -> Self {
        Self {
            silence_window: config.silence_window,
            cap: config.discovery_cap,
        }
    }
}

/// How a session ended. Only `Failed` is an error.
#[derive(Debug)]
pub enum SessionOutcome {
    /// No ProbeMatch arrived within the silence window.
    Quiet,
    /// Responses kept arriving until the hard cap.
    CapReached,
    Cancelled,
    Failed(DiscoveryError),
}

impl SessionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionOutcome::Cancelled)
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Quiet => f.write_str("timed out"),
            SessionOutcome::CapReached => f.write_str("stopped at time limit"),
            SessionOutcome::Cancelled => f.write_str("cancelled"),
            SessionOutcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug)]
pub struct SessionReport {
    pub address: NetworkAddress,
    pub devices: DeviceSet,
    pub outcome: SessionOutcome,
}

/// Sends one probe from `address` and collects the devices that answer it.
pub struct DiscoverySession<T> {
    address: NetworkAddress,
    transport: T,
    probe: ProbeMessage,
    timing: SessionTiming,
    devices: DeviceSet,
}

impl<T: ProbeTransport> DiscoverySession<T> {
    pub fn new(address: NetworkAddress, transport: T, timing: SessionTiming) -> Self {
        Self {
            address,
            transport,
            probe: wsdiscovery::create_random_probe(),
            timing,
            devices: DeviceSet::new(),
        }
    }

    pub async fn run(mut self, cancel: &CancellationToken) -> SessionReport {
        if cancel.is_cancelled() {
            return self.finish(SessionOutcome::Cancelled);
        }

        if let Err(source) = self.transport.send_probe(&self.probe).await {
            let error = self.socket_error(SocketStage::Send, source);
            return self.finish(SessionOutcome::Failed(error));
        }
        debug!("Probe {} sent from {}", self.probe.message_id(), self.address);

        let outcome: SessionOutcome = self.collect(cancel).await;
        self.finish(outcome)
    }

    async fn collect(&mut self, cancel: &CancellationToken) -> SessionOutcome {
        let mut buf: Vec<u8> = vec![0u8; RECV_BUFFER_SIZE];

        let cap = tokio::time::sleep(self.timing.cap);
        tokio::pin!(cap);
        let silence = tokio::time::sleep(self.timing.silence_window);
        tokio::pin!(silence);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return SessionOutcome::Cancelled,

                _ = &mut cap => return SessionOutcome::CapReached,

                _ = &mut silence => return SessionOutcome::Quiet,

                received = self.transport.recv_from(&mut buf) => {
                    match received {
                        Ok((len, source)) => {
                            if self.accept(&buf[..len], source) {
                                silence.as_mut().reset(Instant::now() + self.timing.silence_window);
                            }
                        }
                        Err(source) => {
                            let error = self.socket_error(SocketStage::Receive, source);
                            return SessionOutcome::Failed(error);
                        }
                    }
                }
            }
        }
    }

    /// Records the sender of a valid ProbeMatch. Returns whether the datagram was one.
    fn accept(&mut self, payload: &[u8], source: SocketAddr) -> bool {
        let SocketAddr::V4(source) = source else {
            trace!("Ignoring IPv6 datagram from {source}");
            return false;
        };

        let probe_match: ProbeMatch = match wsdiscovery::inspect_response(payload, &self.probe) {
            Ok(probe_match) => probe_match,
            Err(e) => {
                trace!("Ignoring datagram from {source}: {e}");
                return false;
            }
        };

        let ip: Ipv4Addr = *source.ip();
        let device = DiscoveredDevice::new(ip, self.address.interface())
            .with_xaddrs(probe_match.xaddrs)
            .with_scopes(probe_match.scopes);

        if self.devices.insert(device) {
            debug!("ProbeMatch from {ip} on {}", self.address.interface());
        } else {
            trace!("Duplicate ProbeMatch from {ip}");
        }
        true
    }

    fn socket_error(&self, stage: SocketStage, source: std::io::Error) -> DiscoveryError {
        DiscoveryError::Socket {
            address: self.address.ip(),
            stage,
            source,
        }
    }

    fn finish(self, outcome: SessionOutcome) -> SessionReport {
        let devices: DeviceSet = match &outcome {
            SessionOutcome::Failed(e) => {
                warn!("{e}");
                DeviceSet::new()
            }
            _ => self.devices,
        };
        SessionReport {
            address: self.address,
            devices,
            outcome,
        }
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
