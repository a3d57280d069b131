use std::time::Duration;

use thiserror::Error;

/// Raised when the host's interface list cannot be read.
///
/// Enumeration failures are soft: callers log them and continue with no addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnumerationError {
    #[error("no network interfaces could be enumerated")]
    NoInterfaces,
    #[error("interface '{0}' does not exist or has no usable IPv4 address")]
    UnknownInterface(String),
}

/// Failure of a single request/response exchange with a device service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("credentials rejected by device")]
    Unauthorized,
    #[error("device returned a SOAP fault: {0}")]
    Fault(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no response within {0:?}")]
    TimedOut(Duration),
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}
