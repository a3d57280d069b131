//! # Camera Model
//!
//! A [`CameraDevice`] starts out as a bare address plus [`Credentials`]. Its negotiated half
//! (identity and session handle) is attached in one step once a connection succeeds, so a
//! record is either fully connected or not connected at all.

use std::fmt;

/// Username/password pair used for WS-Security authentication.
///
/// There is deliberately no `Default`: credentials must always be supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity metadata reported by `GetDeviceInformation`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_version: Option<String>,
    pub hardware_id: Option<String>,
}

struct Connection<S> {
    identity: DeviceIdentity,
    session: S,
}

/// A camera under management.
///
/// `S` is the session handle type of the transport in use; the camera owns it exclusively.
pub struct CameraDevice<S> {
    address: String,
    credentials: Credentials,
    connection: Option<Connection<S>>,
}

impl<S> CameraDevice<S> {
    pub fn new(address: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            address: address.into(),
            credentials,
            connection: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.connection.as_ref().map(|c| &c.identity)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.identity().map(|id| id.manufacturer.as_str())
    }

    pub fn model(&self) -> Option<&str> {
        self.identity().map(|id| id.model.as_str())
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.identity().map(|id| id.serial_number.as_str())
    }

    pub fn session(&self) -> Option<&S> {
        self.connection.as_ref().map(|c| &c.session)
    }

    /// Records a successful connection. Identity and session are always set together.
    pub fn attach(&mut self, session: S, identity: DeviceIdentity) {
        self.connection = Some(Connection { identity, session });
    }
}

impl<S> fmt::Debug for CameraDevice<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraDevice")
            .field("address", &self.address)
            .field("credentials", &self.credentials)
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

/// A camera-side stream configuration, referenced by its opaque token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaProfile {
    pub token: String,
    pub name: Option<String>,
}

impl MediaProfile {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    RtpUnicast,
}

impl StreamType {
    /// Wire spelling from the ONVIF schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::RtpUnicast => "RTP-Unicast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    Rtsp,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Rtsp => "RTSP",
        }
    }
}

/// Parameters of a `GetStreamUri` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamNegotiationRequest {
    pub profile_token: String,
    pub stream: StreamType,
    pub transport: TransportProtocol,
}

impl StreamNegotiationRequest {
    /// Unicast RTP delivered over an RTSP session, the mode every ONVIF camera supports.
    pub fn rtsp_unicast(profile: &MediaProfile) -> Self {
        Self {
            profile_token: profile.token.clone(),
            stream: StreamType::RtpUnicast,
            transport: TransportProtocol::Rtsp,
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
