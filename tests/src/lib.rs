//! End-to-end scenarios across the camscout crates, driven by scripted transports and devices.
#![cfg(test)]

mod discovery;
mod net;
mod pass;
mod support;
