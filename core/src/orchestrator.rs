//! # Discovery and Negotiation Pass
//!
//! Sequences a discovery pass with the negotiation of every device it found. Owns no protocol
//! state: everything it learns is returned in a [`PassReport`].

use std::io;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use camscout_common::camera::{CameraDevice, Credentials};
use camscout_common::config::Config;
use camscout_common::network::address::NetworkAddress;
use camscout_common::network::device::{DeviceSet, DiscoveredDevice};
use camscout_common::network::interface;

use crate::discovery::{Discovery, DiscoveryReport, FoundCallback, ProbeTransport, SessionTiming};
use crate::error::NegotiationError;
use crate::negotiation::{DeviceConnector, Negotiator};
use crate::network::multicast::MulticastSocket;

/// Outcome of negotiating one camera.
pub struct CameraReport<S> {
    /// Discovery record the camera came from; `None` for addresses given directly.
    pub device: Option<DiscoveredDevice>,
    pub camera: CameraDevice<S>,
    pub result: Result<String, NegotiationError>,
}

impl<S> CameraReport<S> {
    pub fn stream_uri(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }
}

pub struct PassReport<S> {
    pub discovery: DiscoveryReport,
    /// One entry per discovered device, in discovery order. Empty when negotiation was skipped.
    pub cameras: Vec<CameraReport<S>>,
}

pub struct Orchestrator<C> {
    negotiator: Arc<Negotiator<C>>,
    config: Config,
    cancel: CancellationToken,
}

impl<C> Orchestrator<C>
where
    C: DeviceConnector + 'static,
{
    pub fn new(connector: C, config: Config, cancel: CancellationToken) -> Self {
        let negotiator = Negotiator::new(connector)
            .with_request_timeout(config.request_timeout)
            .with_cancellation(cancel.clone());
        Self {
            negotiator: Arc::new(negotiator),
            config,
            cancel,
        }
    }

    /// Addresses to probe from: every usable local address, or those of the configured
    /// interface only.
    pub fn local_addresses(&self) -> Vec<NetworkAddress> {
        match &self.config.interface {
            Some(name) => interface::addresses_of(name).unwrap_or_else(|e| {
                warn!("{e}");
                Vec::new()
            }),
            None => interface::local_addresses().collect(),
        }
    }

    pub async fn discover(&self, on_found: Option<FoundCallback>) -> DiscoveryReport {
        self.discover_with(self.local_addresses(), open_multicast, on_found)
            .await
    }

    /// Probes from `addresses` over transports supplied by `open`.
    pub async fn discover_with<T, F>(
        &self,
        addresses: Vec<NetworkAddress>,
        open: F,
        on_found: Option<FoundCallback>,
    ) -> DiscoveryReport
    where
        T: ProbeTransport + 'static,
        F: FnMut(&NetworkAddress) -> io::Result<T>,
    {
        info!("Probing from {} local address(es)", addresses.len());

        let mut discovery = Discovery::new(SessionTiming::from(&self.config), self.cancel.clone());
        if let Some(callback) = on_found {
            discovery = discovery.on_found(callback);
        }
        discovery.run_with(addresses, open).await
    }

    /// Negotiates every device in `devices`, at most `workers` at a time.
    ///
    /// Results keep the order of `devices`. One device failing never stops the others.
    pub async fn negotiate_all(
        &self,
        devices: &DeviceSet,
        credentials: &Credentials,
    ) -> Vec<CameraReport<C::Session>> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<(usize, CameraReport<C::Session>)> = JoinSet::new();

        for (index, device) in devices.iter().enumerate() {
            let mut camera = CameraDevice::new(device.negotiation_endpoint(), credentials.clone());
            let device: DiscoveredDevice = device.clone();
            let negotiator = self.negotiator.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits for a free worker.
                let _permit = semaphore.acquire_owned().await;
                let result = negotiator.negotiate(&mut camera).await;
                if let Err(e) = &result {
                    debug!("Negotiation with {} stopped: {e}", device.addr);
                }
                let report = CameraReport {
                    device: Some(device),
                    camera,
                    result,
                };
                (index, report)
            });
        }

        let mut reports: Vec<(usize, CameraReport<C::Session>)> = Vec::with_capacity(devices.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => error!("Negotiation task ended abnormally: {e}"),
            }
        }

        reports.sort_by_key(|(index, _)| *index);
        reports.into_iter().map(|(_, report)| report).collect()
    }

    /// Negotiates a single camera by address, skipping discovery.
    pub async fn negotiate_address(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> CameraReport<C::Session> {
        let mut camera = CameraDevice::new(address, credentials.clone());
        let result = self.negotiator.negotiate(&mut camera).await;
        CameraReport {
            device: None,
            camera,
            result,
        }
    }

    /// Discovery followed by negotiation of everything found.
    ///
    /// Negotiation is skipped when no credentials are configured or the pass was cancelled.
    pub async fn run(&self, on_found: Option<FoundCallback>) -> PassReport<C::Session> {
        self.run_with(self.local_addresses(), open_multicast, on_found)
            .await
    }

    /// Same as [`Orchestrator::run`], probing from `addresses` over transports from `open`.
    pub async fn run_with<T, F>(
        &self,
        addresses: Vec<NetworkAddress>,
        open: F,
        on_found: Option<FoundCallback>,
    ) -> PassReport<C::Session>
    where
        T: ProbeTransport + 'static,
        F: FnMut(&NetworkAddress) -> io::Result<T>,
    {
        let discovery: DiscoveryReport = self.discover_with(addresses, open, on_found).await;

        let cameras = match &self.config.credentials {
            _ if discovery.was_cancelled() => {
                warn!("Discovery cancelled, skipping stream negotiation");
                Vec::new()
            }
            _ if discovery.devices.is_empty() => Vec::new(),
            None => {
                info!("No credentials supplied, skipping stream negotiation");
                Vec::new()
            }
            Some(credentials) => self.negotiate_all(&discovery.devices, credentials).await,
        };

        PassReport { discovery, cameras }
    }
}

fn open_multicast(address: &NetworkAddress) -> io::Result<MulticastSocket> {
    MulticastSocket::open(address.ip())
}
