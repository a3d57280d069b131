use std::fmt;
use std::io;
use std::net::Ipv4Addr;

use thiserror::Error;

use camscout_common::error::TransportError;

use crate::negotiation::NegotiationStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketStage {
    Setup,
    Send,
    Receive,
}

impl fmt::Display for SocketStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage: &str = match self {
            SocketStage::Setup => "opening socket",
            SocketStage::Send => "sending probe",
            SocketStage::Receive => "receiving responses",
        };
        f.write_str(stage)
    }
}

/// A discovery session failure. Contained to the address it happened on.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery socket error on {address} while {stage}: {source}")]
    Socket {
        address: Ipv4Addr,
        stage: SocketStage,
        #[source]
        source: io::Error,
    },
}

/// Why a negotiation stopped, tagged with the step that was being attempted.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("connection to {address} failed: {source}")]
    Connection {
        address: String,
        #[source]
        source: TransportError,
    },
    #[error("fetching device identity failed: {0}")]
    IdentityFetch(#[source] TransportError),
    #[error("no media profiles available")]
    NoMediaProfiles,
    #[error("stream negotiation failed while {step}: {source}")]
    StreamNegotiation {
        step: NegotiationStep,
        #[source]
        source: TransportError,
    },
    #[error("camera is not connected")]
    NotConnected,
    #[error("cancelled while {step}")]
    Cancelled { step: NegotiationStep },
}

impl NegotiationError {
    /// The step that failed.
    pub fn step(&self) -> NegotiationStep {
        match self {
            NegotiationError::Connection { .. } | NegotiationError::NotConnected => {
                NegotiationStep::SessionEstablished
            }
            NegotiationError::IdentityFetch(_) => NegotiationStep::IdentityFetched,
            NegotiationError::NoMediaProfiles => NegotiationStep::ProfilesListed,
            NegotiationError::StreamNegotiation { step, .. } => *step,
            NegotiationError::Cancelled { step } => *step,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NegotiationError::Cancelled { .. })
    }
}
