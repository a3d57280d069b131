//! # ONVIF Device and Media Services
//!
//! Request bodies for the handful of operations camscout uses and extraction of their
//! responses into domain types. Transport (HTTP, timeouts) lives in the engine crate.

use camscout_common::camera::{DeviceIdentity, MediaProfile, StreamNegotiationRequest};
use camscout_common::error::TransportError;

use crate::{soap, xml};

pub const DEVICE_SERVICE_PATH: &str = "/onvif/device_service";
pub const MEDIA_SERVICE_PATH: &str = "/onvif/media_service";

const DEVICE_NS: &str = "http://www.onvif.org/ver10/device/wsdl";
const MEDIA_NS: &str = "http://www.onvif.org/ver10/media/wsdl";
const SCHEMA_NS: &str = "http://www.onvif.org/ver10/schema";

/// Turns a bare address into a device service URL.
///
/// `192.168.1.10` becomes `http://192.168.1.10/onvif/device_service`; anything that already
/// has a scheme and a path is kept as is.
pub fn device_service_url(address: &str) -> String {
    let address: &str = address.trim();
    let url: String = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };

    if has_path(&url) {
        url
    } else {
        format!("{}{DEVICE_SERVICE_PATH}", url.trim_end_matches('/'))
    }
}

/// The conventional media service URL on the same host as `device_url`.
pub fn media_service_url(device_url: &str) -> String {
    let (scheme, rest) = device_url.split_once("://").unwrap_or(("http", device_url));
    let authority: &str = rest.split('/').next().unwrap_or(rest);
    format!("{scheme}://{authority}{MEDIA_SERVICE_PATH}")
}

fn has_path(url: &str) -> bool {
    url.split_once("://")
        .map(|(_, rest)| rest.trim_end_matches('/').contains('/'))
        .unwrap_or(false)
}

pub fn get_device_information() -> String {
    format!(r#"<tds:GetDeviceInformation xmlns:tds="{DEVICE_NS}"/>"#)
}

pub fn get_capabilities() -> String {
    format!(
        r#"<tds:GetCapabilities xmlns:tds="{DEVICE_NS}"><tds:Category>Media</tds:Category></tds:GetCapabilities>"#
    )
}

pub fn get_profiles() -> String {
    format!(r#"<trt:GetProfiles xmlns:trt="{MEDIA_NS}"/>"#)
}

pub fn get_stream_uri(request: &StreamNegotiationRequest) -> String {
    format!(
        concat!(
            r#"<trt:GetStreamUri xmlns:trt="{media}" xmlns:tt="{schema}">"#,
            "<trt:StreamSetup>",
            "<tt:Stream>{stream}</tt:Stream>",
            "<tt:Transport><tt:Protocol>{protocol}</tt:Protocol></tt:Transport>",
            "</trt:StreamSetup>",
            "<trt:ProfileToken>{token}</trt:ProfileToken>",
            "</trt:GetStreamUri>",
        ),
        media = MEDIA_NS,
        schema = SCHEMA_NS,
        stream = request.stream.as_str(),
        protocol = request.transport.as_str(),
        token = xml::escape(&request.profile_token),
    )
}

/// Maps a SOAP fault in `response` to the matching [`TransportError`].
pub fn check_fault(response: &str) -> Result<(), TransportError> {
    match soap::fault(response) {
        Some(fault) if fault.not_authorized => Err(TransportError::Unauthorized),
        Some(fault) => Err(TransportError::Fault(fault.reason)),
        None => Ok(()),
    }
}

fn response_body<'a>(response: &'a str, element: &str) -> Result<&'a str, TransportError> {
    check_fault(response)?;
    xml::element(response, element)
        .map(|element| element.body)
        .ok_or_else(|| TransportError::Malformed(format!("missing {element}")))
}

fn owned_text(xml_text: &str, local: &str) -> Option<String> {
    xml::element_text(xml_text, local).map(|text| xml::unescape(text).into_owned())
}

pub fn parse_device_information(response: &str) -> Result<DeviceIdentity, TransportError> {
    let body: &str = response_body(response, "GetDeviceInformationResponse")?;
    let manufacturer: Option<String> = owned_text(body, "Manufacturer");
    let model: Option<String> = owned_text(body, "Model");

    if manufacturer.is_none() && model.is_none() {
        return Err(TransportError::Malformed(
            "device information lacks both manufacturer and model".to_string(),
        ));
    }

    Ok(DeviceIdentity {
        manufacturer: manufacturer.unwrap_or_default(),
        model: model.unwrap_or_default(),
        serial_number: owned_text(body, "SerialNumber").unwrap_or_default(),
        firmware_version: owned_text(body, "FirmwareVersion"),
        hardware_id: owned_text(body, "HardwareId"),
    })
}

/// Media service address from a `GetCapabilities` response, if the device reports one.
pub fn parse_media_xaddr(response: &str) -> Result<Option<String>, TransportError> {
    let body: &str = response_body(response, "GetCapabilitiesResponse")?;
    Ok(xml::element(body, "Media").and_then(|media| owned_text(media.body, "XAddr")))
}

/// Profiles in the order the device listed them. An empty list is a valid response.
pub fn parse_profiles(response: &str) -> Result<Vec<MediaProfile>, TransportError> {
    let body: &str = response_body(response, "GetProfilesResponse")?;
    xml::elements(body, "Profiles")
        .into_iter()
        .map(|profile| {
            let token: &str = profile
                .attribute("token")
                .ok_or_else(|| TransportError::Malformed("profile without token".to_string()))?;
            let mut media_profile = MediaProfile::new(xml::unescape(token).into_owned());
            if let Some(name) = owned_text(profile.body, "Name") {
                media_profile = media_profile.with_name(name);
            }
            Ok(media_profile)
        })
        .collect()
}

pub fn parse_stream_uri(response: &str) -> Result<String, TransportError> {
    let body: &str = response_body(response, "GetStreamUriResponse")?;
    let media_uri = xml::element(body, "MediaUri")
        .ok_or_else(|| TransportError::Malformed("missing MediaUri".to_string()))?;
    owned_text(media_uri.body, "Uri")
        .ok_or_else(|| TransportError::Malformed("empty stream URI".to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
