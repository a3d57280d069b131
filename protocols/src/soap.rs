//! SOAP 1.2 envelopes with WS-Security UsernameToken authentication.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};

use camscout_common::camera::Credentials;

use crate::xml;

pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const BASE64_ENCODING_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// A WS-Security UsernameToken with a SHA-1 password digest.
///
/// Each request should carry a fresh token: devices reject replayed nonces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    username: String,
    digest: String,
    nonce: String,
    created: String,
}

impl UsernameToken {
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_nonce(credentials, rand::random(), Utc::now())
    }

    pub fn with_nonce(credentials: &Credentials, nonce: [u8; 16], created: DateTime<Utc>) -> Self {
        let created: String = created.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        Self {
            username: credentials.username().to_string(),
            digest: password_digest(&nonce, &created, credentials.password()),
            nonce: STANDARD.encode(nonce),
            created,
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn to_header(&self) -> String {
        format!(
            concat!(
                r#"<wsse:Security xmlns:wsse="{wsse}" xmlns:wsu="{wsu}">"#,
                "<wsse:UsernameToken>",
                "<wsse:Username>{username}</wsse:Username>",
                r#"<wsse:Password Type="{digest_type}">{digest}</wsse:Password>"#,
                r#"<wsse:Nonce EncodingType="{encoding}">{nonce}</wsse:Nonce>"#,
                "<wsu:Created>{created}</wsu:Created>",
                "</wsse:UsernameToken>",
                "</wsse:Security>",
            ),
            wsse = WSSE_NS,
            wsu = WSU_NS,
            username = xml::escape(&self.username),
            digest_type = PASSWORD_DIGEST_TYPE,
            digest = self.digest,
            encoding = BASE64_ENCODING_TYPE,
            nonce = self.nonce,
            created = self.created,
        )
    }
}

/// `Base64(SHA1(nonce + created + password))`.
pub fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub fn envelope(security: Option<&UsernameToken>, body: &str) -> String {
    let header: String = security.map(UsernameToken::to_header).unwrap_or_default();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">"#,
            "<s:Header>{}</s:Header>",
            "<s:Body>{}</s:Body>",
            "</s:Envelope>",
        ),
        header, body
    )
}

/// A SOAP fault extracted from a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub reason: String,
    pub not_authorized: bool,
}

/// Returns the fault carried by `response`, if any.
///
/// Understands SOAP 1.2 (`Reason/Text`, `Subcode/Value`) and SOAP 1.1 (`faultstring`).
pub fn fault(response: &str) -> Option<Fault> {
    let body = xml::element(response, "Fault")?.body;
    let reason: String = xml::element(body, "Reason")
        .and_then(|reason| xml::element_text(reason.body, "Text"))
        .or_else(|| xml::element_text(body, "faultstring"))
        .unwrap_or("unspecified fault")
        .to_string();

    let codes: String = xml::elements(body, "Value")
        .iter()
        .map(|value| value.text())
        .chain(xml::element_text(body, "faultcode"))
        .collect::<Vec<&str>>()
        .join(" ");

    let not_authorized: bool = ["NotAuthorized", "FailedAuthentication", "Sender.NotAuthorized"]
        .iter()
        .any(|code| codes.contains(code));

    Some(Fault {
        reason: xml::unescape(&reason).into_owned(),
        not_authorized,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
