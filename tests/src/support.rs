use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use camscout_common::camera::{Credentials, DeviceIdentity, MediaProfile, StreamNegotiationRequest};
use camscout_common::error::TransportError;
use camscout_common::network::address::NetworkAddress;
use camscout_core::discovery::ProbeTransport;
use camscout_core::negotiation::{DeviceConnector, DeviceSession};
use camscout_protocols::wsdiscovery::ProbeMessage;

pub fn network_address(ip: [u8; 4], interface: &str) -> NetworkAddress {
    NetworkAddress::new(Ipv4Addr::from(ip), interface, 1)
}

pub fn probe_match(device: Ipv4Addr, relates_to: Option<String>) -> Vec<u8> {
    probe_match_advertising(device, &format!("http://{device}/onvif/device_service"), relates_to)
}

pub fn probe_match_advertising(device: Ipv4Addr, xaddr: &str, relates_to: Option<String>) -> Vec<u8> {
    let relates_to: String = relates_to
        .map(|id| format!("<wsa:RelatesTo>{id}</wsa:RelatesTo>"))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope" "#,
            r#"xmlns:wsa="http://schemas.xmlsoap.org/ws/2004/08/addressing" "#,
            r#"xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery">"#,
            "<SOAP-ENV:Header>{relates_to}</SOAP-ENV:Header>",
            "<SOAP-ENV:Body><d:ProbeMatches><d:ProbeMatch>",
            "<wsa:EndpointReference><wsa:Address>urn:uuid:{device}</wsa:Address></wsa:EndpointReference>",
            "<d:Scopes>onvif://www.onvif.org/type/video_encoder onvif://www.onvif.org/name/Cam%20{device}</d:Scopes>",
            "<d:XAddrs>{xaddr}</d:XAddrs>",
            "</d:ProbeMatch></d:ProbeMatches></SOAP-ENV:Body></SOAP-ENV:Envelope>",
        ),
        relates_to = relates_to,
        device = device,
        xaddr = xaddr,
    )
    .into_bytes()
}

pub enum Reply {
    /// A ProbeMatch answering the probe that was actually sent.
    Match(Ipv4Addr),
    /// A matching ProbeMatch whose only XAddr names another host.
    Advertising(Ipv4Addr, &'static str),
    /// A ProbeMatch claiming to answer some other probe.
    Stale(Ipv4Addr),
    Noise(Ipv4Addr),
    Wait(Duration),
}

/// Plays back replies in order after the probe is sent, then goes silent.
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    probe: Option<ProbeMessage>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            probe: None,
        }
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn send_probe(&mut self, probe: &ProbeMessage) -> io::Result<()> {
        self.probe = Some(probe.clone());
        Ok(())
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        loop {
            let (payload, source): (Vec<u8>, Ipv4Addr) = match self.replies.pop_front() {
                Some(Reply::Match(ip)) => {
                    let relates_to = self.probe.as_ref().map(ProbeMessage::message_id_urn);
                    (probe_match(ip, relates_to), ip)
                }
                Some(Reply::Advertising(ip, xaddr)) => {
                    let relates_to = self.probe.as_ref().map(ProbeMessage::message_id_urn);
                    (probe_match_advertising(ip, xaddr, relates_to), ip)
                }
                Some(Reply::Stale(ip)) => {
                    let other = "urn:uuid:00000000-0000-4000-8000-000000000000".to_string();
                    (probe_match(ip, Some(other)), ip)
                }
                Some(Reply::Noise(ip)) => (b"M-SEARCH * HTTP/1.1\r\n\r\n".to_vec(), ip),
                Some(Reply::Wait(delay)) => {
                    tokio::time::sleep(delay).await;
                    continue;
                }
                None => std::future::pending().await,
            };
            buf[..payload.len()].copy_from_slice(&payload);
            return Ok((payload.len(), SocketAddr::V4(SocketAddrV4::new(source, 3702))));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Healthy,
    Unreachable,
    RejectsCredentials,
    NoProfiles,
    Hangs,
    Slow(Duration),
}

#[derive(Default)]
pub struct Stats {
    active: AtomicUsize,
    peak: AtomicUsize,
    stream_requests: Mutex<Vec<String>>,
}

impl Stats {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn stream_requests(&self) -> Vec<String> {
        self.stream_requests.lock().unwrap().clone()
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fake fleet of cameras keyed by address. Unknown addresses are unreachable.
#[derive(Default)]
pub struct FakeFleet {
    cameras: HashMap<Ipv4Addr, Behavior>,
    pub stats: Arc<Stats>,
}

impl FakeFleet {
    pub fn with(mut self, ip: [u8; 4], behavior: Behavior) -> Self {
        self.cameras.insert(Ipv4Addr::from(ip), behavior);
        self
    }
}

fn endpoint_host(endpoint: &str) -> Option<Ipv4Addr> {
    let rest = endpoint.split_once("://").map_or(endpoint, |(_, rest)| rest);
    rest.split(['/', ':']).next()?.parse().ok()
}

#[async_trait]
impl DeviceConnector for FakeFleet {
    type Session = FakeCamera;

    async fn connect(&self, endpoint: &str, credentials: &Credentials) -> Result<FakeCamera, TransportError> {
        let host = endpoint_host(endpoint).ok_or_else(|| TransportError::InvalidEndpoint(endpoint.into()))?;
        match self.cameras.get(&host) {
            None | Some(Behavior::Unreachable) => Err(TransportError::Unreachable(format!("{host}: no route"))),
            Some(Behavior::RejectsCredentials) => Err(TransportError::Unauthorized),
            Some(_) if credentials.password().is_empty() => Err(TransportError::Unauthorized),
            Some(behavior) => Ok(FakeCamera {
                host,
                behavior: *behavior,
                stats: self.stats.clone(),
            }),
        }
    }
}

pub struct FakeCamera {
    host: Ipv4Addr,
    behavior: Behavior,
    stats: Arc<Stats>,
}

#[async_trait]
impl DeviceSession for FakeCamera {
    async fn get_device_information(&self) -> Result<DeviceIdentity, TransportError> {
        Ok(DeviceIdentity {
            manufacturer: "Acme".into(),
            model: "CamX".into(),
            serial_number: format!("SN-{}", self.host.octets()[3]),
            firmware_version: Some("1.0.0".into()),
            hardware_id: None,
        })
    }

    async fn get_profiles(&self) -> Result<Vec<MediaProfile>, TransportError> {
        self.stats.enter();
        let result = match self.behavior {
            Behavior::NoProfiles => Ok(Vec::new()),
            Behavior::Hangs => std::future::pending().await,
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(vec![MediaProfile::new("token1")])
            }
            _ => Ok(vec![
                MediaProfile::new("token1").with_name("MainStream"),
                MediaProfile::new("token2").with_name("SubStream"),
            ]),
        };
        self.stats.leave();
        result
    }

    async fn get_stream_uri(&self, request: &StreamNegotiationRequest) -> Result<String, TransportError> {
        self.stats
            .stream_requests
            .lock()
            .unwrap()
            .push(format!("{} {}", self.host, request.profile_token));
        Ok(format!("rtsp://{}:554/{}", self.host, request.profile_token))
    }
}
