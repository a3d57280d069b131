//! # camscout engine
//!
//! Finds ONVIF cameras with WS-Discovery and negotiates an RTSP stream URI from each.
//!
//! * [`discovery`]: one multicast session per local address, merged into a single result.
//! * [`negotiation`]: the fixed connect, identify, list profiles, get stream URI sequence.
//! * [`orchestrator`]: sequencing of both passes with bounded concurrency and cancellation.
//! * [`network`]: the concrete multicast socket and SOAP-over-HTTP device client.

pub mod discovery;
pub mod error;
pub mod negotiation;
pub mod network;
pub mod orchestrator;
