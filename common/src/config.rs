use std::time::Duration;

use crate::camera::Credentials;

/// Quiet time after which a discovery session stops listening.
pub const DEFAULT_SILENCE_WINDOW: Duration = Duration::from_secs(3);
/// Upper bound on a discovery session, however chatty the segment is.
pub const DEFAULT_DISCOVERY_CAP: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    /// Re-armed after every accepted response; the first window starts at the first receive.
    pub silence_window: Duration,
    pub discovery_cap: Duration,
    /// Applies to each remote exchange of a negotiation separately.
    pub request_timeout: Duration,
    /// Number of cameras negotiated concurrently.
    pub workers: usize,
    /// Restricts discovery to a single interface by name.
    pub interface: Option<String>,
    /// Negotiation is skipped entirely when absent.
    pub credentials: Option<Credentials>,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_window: DEFAULT_SILENCE_WINDOW,
            discovery_cap: DEFAULT_DISCOVERY_CAP,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            workers: DEFAULT_WORKERS,
            interface: None,
            credentials: None,
            quiet: 0,
        }
    }
}
