//! # Discovery Pass
//!
//! Runs one [`DiscoverySession`] per local address, each on its own task with its own socket,
//! and merges their results into a single [`DeviceSet`] once they are all done.
//!
//! Sessions never share state: each reports back over a channel and a single collector owns
//! the merged set. A failure on one address is logged and leaves the others untouched.

mod session;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use camscout_common::network::{address::NetworkAddress, device::DeviceSet, device::DiscoveredDevice};
use camscout_protocols::wsdiscovery::ProbeMessage;

use crate::error::{DiscoveryError, SocketStage};

pub use session::{DiscoverySession, SessionOutcome, SessionReport, SessionTiming};

/// Datagram I/O used by a discovery session.
#[async_trait]
pub trait ProbeTransport: Send {
    async fn send_probe(&mut self, probe: &ProbeMessage) -> io::Result<()>;
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

/// Called by the collector for every device that was not already known.
pub type FoundCallback = Arc<dyn Fn(&DiscoveredDevice) + Send + Sync>;

#[derive(Debug)]
pub struct SessionSummary {
    pub address: NetworkAddress,
    /// Devices this address saw, duplicates from other addresses included.
    pub found: usize,
    pub outcome: SessionOutcome,
}

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub devices: DeviceSet,
    pub sessions: Vec<SessionSummary>,
    pub elapsed: Duration,
}

impl DiscoveryReport {
    pub fn was_cancelled(&self) -> bool {
        self.sessions.iter().any(|session| session.outcome.is_cancelled())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SessionSummary> {
        self.sessions.iter().filter(|session| session.outcome.is_failure())
    }
}

pub struct Discovery {
    timing: SessionTiming,
    cancel: CancellationToken,
    on_found: Option<FoundCallback>,
}

impl Discovery {
    pub fn new(timing: SessionTiming, cancel: CancellationToken) -> Self {
        Self {
            timing,
            cancel,
            on_found: None,
        }
    }

    pub fn on_found(mut self, callback: FoundCallback) -> Self {
        self.on_found = Some(callback);
        self
    }

    /// Probes from every address in `addresses`, with the transport for each supplied by `open`.
    pub async fn run_with<T, F>(&self, addresses: Vec<NetworkAddress>, mut open: F) -> DiscoveryReport
    where
        T: ProbeTransport + 'static,
        F: FnMut(&NetworkAddress) -> io::Result<T>,
    {
        let started: Instant = Instant::now();
        if addresses.is_empty() {
            warn!("No usable local addresses, nothing to probe from");
            return DiscoveryReport::default();
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<SessionReport>();
        let mut tasks: JoinSet<()> = JoinSet::new();

        for address in addresses {
            let transport: T = match open(&address) {
                Ok(transport) => transport,
                Err(source) => {
                    let error = DiscoveryError::Socket {
                        address: address.ip(),
                        stage: SocketStage::Setup,
                        source,
                    };
                    warn!("{error}");
                    let _ = tx.send(SessionReport {
                        address,
                        devices: DeviceSet::new(),
                        outcome: SessionOutcome::Failed(error),
                    });
                    continue;
                }
            };

            debug!("Starting discovery session on {address}");
            let tx = tx.clone();
            let cancel: CancellationToken = self.cancel.clone();
            let session = DiscoverySession::new(address, transport, self.timing);
            tasks.spawn(async move {
                let report: SessionReport = session.run(&cancel).await;
                let _ = tx.send(report);
            });
        }
        drop(tx);

        let mut report = DiscoveryReport::default();
        while let Some(session) = rx.recv().await {
            self.collect(&mut report, session);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Discovery task ended abnormally: {e}");
            }
        }

        report.elapsed = started.elapsed();
        info!(
            "Discovery finished with {} device(s) across {} address(es)",
            report.devices.len(),
            report.sessions.len()
        );
        report
    }

    fn collect(&self, report: &mut DiscoveryReport, session: SessionReport) {
        let found: usize = session.devices.len();
        debug!("{} {} with {found} device(s)", session.address, session.outcome);

        for device in session.devices {
            if report.devices.contains(&device.addr) {
                continue;
            }
            if let Some(callback) = &self.on_found {
                callback(&device);
            }
            report.devices.insert(device);
        }

        report.sessions.push(SessionSummary {
            address: session.address,
            found,
            outcome: session.outcome,
        });
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
