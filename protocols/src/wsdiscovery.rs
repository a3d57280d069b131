//! # WS-Discovery
//!
//! Builds the multicast `Probe` for ONVIF NetworkVideoTransmitters and inspects the
//! `ProbeMatches` that come back.
//!
//! The probe is a fixed envelope; only the `MessageID` changes between calls. Responses are
//! attributed to their sender's address by the caller. Here they are only checked to be
//! ProbeMatches (and, when `RelatesTo` is present, to answer our probe) so stray multicast
//! traffic on port 3702 is not mistaken for a camera.

use std::net::{Ipv4Addr, SocketAddrV4};

use thiserror::Error;
use uuid::Uuid;

use crate::xml;

pub const WS_DISCOVERY_PORT: u16 = 3702;
pub const WS_DISCOVERY_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
pub const WS_DISCOVERY_TARGET: SocketAddrV4 = SocketAddrV4::new(WS_DISCOVERY_GROUP, WS_DISCOVERY_PORT);

const PROBE_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<e:Envelope xmlns:e="http://www.w3.org/2003/05/soap-envelope" "#,
    r#"xmlns:w="http://schemas.xmlsoap.org/ws/2004/08/addressing" "#,
    r#"xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery" "#,
    r#"xmlns:dn="http://www.onvif.org/ver10/network/wsdl">"#,
    "<e:Header>",
    "<w:MessageID>",
);

const PROBE_TAIL: &str = concat!(
    "</w:MessageID>",
    "<w:To>urn:schemas-xmlsoap-org:ws:2005:04:discovery</w:To>",
    "<w:Action>http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe</w:Action>",
    "</e:Header>",
    "<e:Body>",
    "<d:Probe>",
    "<d:Types>dn:NetworkVideoTransmitter</d:Types>",
    "</d:Probe>",
    "</e:Body>",
    "</e:Envelope>",
);

/// A ready-to-send Probe datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeMessage {
    message_id: Uuid,
    payload: Vec<u8>,
}

impl ProbeMessage {
    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// The identifier as written in the envelope, e.g. `uuid:84ede3de-...`.
    pub fn message_id_urn(&self) -> String {
        format!("uuid:{}", self.message_id)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

pub fn create_probe(message_id: Uuid) -> ProbeMessage {
    let payload: String = format!("{PROBE_HEAD}uuid:{message_id}{PROBE_TAIL}");
    ProbeMessage {
        message_id,
        payload: payload.into_bytes(),
    }
}

/// A probe carrying a freshly drawn random (version 4) identifier.
pub fn create_random_probe() -> ProbeMessage {
    create_probe(random_message_id())
}

pub fn random_message_id() -> Uuid {
    uuid::Builder::from_random_bytes(rand::random()).into_uuid()
}

/// Fields of interest from a `ProbeMatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeMatch {
    pub relates_to: Option<String>,
    pub xaddrs: Vec<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeMatchError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,
    #[error("payload is not a ProbeMatches envelope")]
    NotProbeMatch,
    #[error("response relates to {found}, not to probe {expected}")]
    Unrelated { expected: String, found: String },
}

pub fn parse_probe_match(payload: &[u8]) -> Result<ProbeMatch, ProbeMatchError> {
    let text: &str = std::str::from_utf8(payload).map_err(|_| ProbeMatchError::NotUtf8)?;
    if !xml::contains_element(text, "ProbeMatches") {
        return Err(ProbeMatchError::NotProbeMatch);
    }

    let relates_to: Option<String> = xml::element_text(text, "RelatesTo").map(str::to_string);

    Ok(ProbeMatch {
        relates_to,
        xaddrs: split_list(xml::element_text(text, "XAddrs")),
        scopes: split_list(xml::element_text(text, "Scopes")),
    })
}

/// Parses `payload` and checks it answers `probe`.
///
/// Responses without `RelatesTo` are accepted; several camera firmwares omit it.
pub fn inspect_response(payload: &[u8], probe: &ProbeMessage) -> Result<ProbeMatch, ProbeMatchError> {
    let probe_match: ProbeMatch = parse_probe_match(payload)?;
    if let Some(found) = &probe_match.relates_to {
        let expected: String = probe.message_id_urn();
        if normalize_id(found) != normalize_id(&expected) {
            return Err(ProbeMatchError::Unrelated {
                expected,
                found: found.clone(),
            });
        }
    }
    Ok(probe_match)
}

fn normalize_id(id: &str) -> String {
    let id: &str = id.trim();
    let id: &str = id.strip_prefix("urn:").unwrap_or(id);
    id.to_ascii_lowercase()
}

fn split_list(text: Option<&str>) -> Vec<String> {
    text.map(|text| {
        text.split_whitespace()
            .map(|item| xml::unescape(item).into_owned())
            .collect()
    })
    .unwrap_or_default()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
