//! ONVIF device client speaking SOAP 1.2 over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::{debug, trace};

use camscout_common::camera::{Credentials, DeviceIdentity, MediaProfile, StreamNegotiationRequest};
use camscout_common::error::TransportError;
use camscout_protocols::onvif;
use camscout_protocols::soap::{self, SOAP_CONTENT_TYPE, UsernameToken};

use crate::negotiation::{DeviceConnector, DeviceSession};

pub struct OnvifConnector {
    client: Client,
    timeout: Duration,
}

impl OnvifConnector {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client: Client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl DeviceConnector for OnvifConnector {
    type Session = OnvifSession;

    /// Calls `GetCapabilities` to confirm the device answers and to learn where its media
    /// service lives.
    async fn connect(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<OnvifSession, TransportError> {
        let url: reqwest::Url = endpoint
            .parse()
            .map_err(|_| TransportError::InvalidEndpoint(endpoint.to_string()))?;

        let mut session = OnvifSession {
            client: self.client.clone(),
            timeout: self.timeout,
            device_url: url.to_string(),
            media_url: onvif::media_service_url(endpoint),
            credentials: credentials.clone(),
        };

        let capabilities = session
            .call(&session.device_url, &onvif::get_capabilities())
            .await
            .and_then(|response| onvif::parse_media_xaddr(&response));

        match capabilities {
            Ok(Some(media_url)) => session.media_url = media_url,
            Ok(None) | Err(TransportError::Fault(_)) | Err(TransportError::Malformed(_)) => {
                debug!(
                    "No media service advertised by {endpoint}, assuming {}",
                    session.media_url
                );
            }
            Err(e) => return Err(e),
        }
        Ok(session)
    }
}

/// An authenticated session with one device.
///
/// Every request carries a fresh UsernameToken.
pub struct OnvifSession {
    client: Client,
    timeout: Duration,
    device_url: String,
    media_url: String,
    credentials: Credentials,
}

impl OnvifSession {
    async fn call(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let token = UsernameToken::new(&self.credentials);
        let envelope: String = soap::envelope(Some(&token), body);
        trace!("POST {url}: {body}");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(envelope)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status: StatusCode = response.status();
        let text: String = response.text().await.map_err(|e| self.transport_error(e))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized);
        }
        onvif::check_fault(&text)?;
        if !status.is_success() {
            return Err(TransportError::Fault(format!("HTTP {status}")));
        }
        Ok(text)
    }

    fn transport_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::TimedOut(self.timeout)
        } else if error.is_builder() {
            TransportError::InvalidEndpoint(error.to_string())
        } else {
            TransportError::Unreachable(error.to_string())
        }
    }
}

#[async_trait]
impl DeviceSession for OnvifSession {
    async fn get_device_information(&self) -> Result<DeviceIdentity, TransportError> {
        let response: String = self
            .call(&self.device_url, &onvif::get_device_information())
            .await?;
        onvif::parse_device_information(&response)
    }

    async fn get_profiles(&self) -> Result<Vec<MediaProfile>, TransportError> {
        let response: String = self.call(&self.media_url, &onvif::get_profiles()).await?;
        onvif::parse_profiles(&response)
    }

    async fn get_stream_uri(
        &self,
        request: &StreamNegotiationRequest,
    ) -> Result<String, TransportError> {
        let response: String = self
            .call(&self.media_url, &onvif::get_stream_uri(request))
            .await?;
        onvif::parse_stream_uri(&response)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
