//! Shared building blocks for camscout.
//!
//! * [`camera`]: camera records, credentials and stream negotiation models.
//! * [`network`]: local addresses, interface enumeration and discovered devices.
//! * [`config`]: runtime configuration assembled by the CLI.
//! * [`error`]: error kinds shared between the protocol and engine crates.

pub mod camera;
pub mod config;
pub mod error;
pub mod network;
pub mod utils;
