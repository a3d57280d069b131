//! # Device Negotiation
//!
//! Walks a camera through `Disconnected → SessionEstablished → IdentityFetched →
//! ProfilesListed → StreamNegotiated`, one remote exchange per step.
//!
//! The first two steps are committed together by [`Negotiator::connect`]: the session handle
//! and identity are attached to the [`CameraDevice`] only once both have succeeded. The stream
//! steps in [`Negotiator::stream_uri`] only read from a connected camera, so a failure there
//! leaves the record as it was.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use camscout_common::camera::{
    CameraDevice, Credentials, DeviceIdentity, MediaProfile, StreamNegotiationRequest,
};
use camscout_common::config::DEFAULT_REQUEST_TIMEOUT;
use camscout_common::error::TransportError;
use camscout_protocols::onvif;

use crate::error::NegotiationError;

/// Opens authenticated sessions with devices.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    type Session: DeviceSession;

    /// `endpoint` is a full device service URL.
    async fn connect(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Self::Session, TransportError>;
}

/// Requests available once a session with a device is established.
#[async_trait]
pub trait DeviceSession: Send + Sync + 'static {
    async fn get_device_information(&self) -> Result<DeviceIdentity, TransportError>;

    /// Profiles in the order the device reports them.
    async fn get_profiles(&self) -> Result<Vec<MediaProfile>, TransportError>;

    async fn get_stream_uri(
        &self,
        request: &StreamNegotiationRequest,
    ) -> Result<String, TransportError>;
}

/// The step a negotiation is attempting, named after the state it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    SessionEstablished,
    IdentityFetched,
    ProfilesListed,
    StreamNegotiated,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step: &str = match self {
            NegotiationStep::SessionEstablished => "establishing session",
            NegotiationStep::IdentityFetched => "fetching identity",
            NegotiationStep::ProfilesListed => "listing media profiles",
            NegotiationStep::StreamNegotiated => "requesting stream URI",
        };
        f.write_str(step)
    }
}

enum Interrupted {
    Cancelled,
    Failed(TransportError),
}

pub struct Negotiator<C> {
    connector: C,
    request_timeout: Duration,
    cancel: CancellationToken,
}

impl<C: DeviceConnector> Negotiator<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Establishes a session and fetches the device identity.
    ///
    /// On success both are attached to `camera`; on failure `camera` is left untouched.
    pub async fn connect(&self, camera: &mut CameraDevice<C::Session>) -> Result<(), NegotiationError> {
        let endpoint: String = onvif::device_service_url(camera.address());
        debug!("Connecting to {endpoint}");

        let session: C::Session = self
            .exchange(self.connector.connect(&endpoint, camera.credentials()))
            .await
            .map_err(|interrupted| match interrupted {
                Interrupted::Cancelled => NegotiationError::Cancelled {
                    step: NegotiationStep::SessionEstablished,
                },
                Interrupted::Failed(source) => NegotiationError::Connection {
                    address: endpoint.clone(),
                    source,
                },
            })?;

        let identity: DeviceIdentity = self
            .exchange(session.get_device_information())
            .await
            .map_err(|interrupted| match interrupted {
                Interrupted::Cancelled => NegotiationError::Cancelled {
                    step: NegotiationStep::IdentityFetched,
                },
                // Devices often serve GetCapabilities anonymously, so the first authenticated
                // request is where a wrong password shows.
                Interrupted::Failed(TransportError::Unauthorized) => NegotiationError::Connection {
                    address: endpoint.clone(),
                    source: TransportError::Unauthorized,
                },
                Interrupted::Failed(source) => NegotiationError::IdentityFetch(source),
            })?;

        info!(
            "Connected to {} {} at {}",
            identity.manufacturer,
            identity.model,
            camera.address()
        );
        camera.attach(session, identity);
        Ok(())
    }

    /// Lists the media profiles of a connected camera and requests an RTSP unicast URI for the
    /// first one.
    pub async fn stream_uri(&self, camera: &CameraDevice<C::Session>) -> Result<String, NegotiationError> {
        let session: &C::Session = camera.session().ok_or(NegotiationError::NotConnected)?;

        let profiles: Vec<MediaProfile> = self
            .exchange(session.get_profiles())
            .await
            .map_err(|interrupted| stream_error(NegotiationStep::ProfilesListed, interrupted))?;

        let profile: &MediaProfile = profiles.first().ok_or(NegotiationError::NoMediaProfiles)?;
        debug!("Using profile '{}' of {}", profile.token, camera.address());

        let request = StreamNegotiationRequest::rtsp_unicast(profile);
        let uri: String = self
            .exchange(session.get_stream_uri(&request))
            .await
            .map_err(|interrupted| stream_error(NegotiationStep::StreamNegotiated, interrupted))?;

        info!("Stream URI for {}: {uri}", camera.address());
        Ok(uri)
    }

    /// Runs every step in order. Connects first unless `camera` already is.
    pub async fn negotiate(&self, camera: &mut CameraDevice<C::Session>) -> Result<String, NegotiationError> {
        if !camera.is_connected() {
            self.connect(camera).await?;
        }
        self.stream_uri(camera).await
    }

    /// Awaits one remote exchange under the request timeout, or until cancelled.
    async fn exchange<T, F>(&self, request: F) -> Result<T, Interrupted>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),

            response = tokio::time::timeout(self.request_timeout, request) => match response {
                Ok(result) => result.map_err(Interrupted::Failed),
                Err(_) => Err(Interrupted::Failed(TransportError::TimedOut(self.request_timeout))),
            },
        }
    }
}

fn stream_error(step: NegotiationStep, interrupted: Interrupted) -> NegotiationError {
    match interrupted {
        Interrupted::Cancelled => NegotiationError::Cancelled { step },
        Interrupted::Failed(source) => NegotiationError::StreamNegotiation { step, source },
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
