use soap_client::{SoapClient, SubscriptionResponse};
use url::Url;

use crate::{ApiError, Result, Service, SonosOperation};

/// A client for executing Sonos operations against actual devices
///
/// Bridges the stateless operation definitions and the network. SOAP actions
/// go to the service control path, GENA requests to the service event path,
/// both resolved against the device base URL (`http://host:1400`).
///
/// ```rust,ignore
/// use sonos_api::{SonosClient, Service};
/// use sonos_api::operations::{GetZoneGroupStateOperation, GetZoneGroupStateRequest};
///
/// let client = SonosClient::new();
/// let base = url::Url::parse("http://192.168.1.100:1400")?;
/// let topology = client
///     .execute::<GetZoneGroupStateOperation>(&base, &GetZoneGroupStateRequest)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SonosClient {
    soap_client: SoapClient,
}

impl SonosClient {
    /// Create a client with the default SOAP client (10 second timeout)
    pub fn new() -> Self {
        Self::with_soap_client(SoapClient::new())
    }

    /// Create a Sonos client with a custom SOAP client
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self { soap_client }
    }

    pub fn soap_client(&self) -> &SoapClient {
        &self.soap_client
    }

    /// Execute a Sonos operation against a device
    ///
    /// # Arguments
    /// * `base_url` - Device base URL
    /// * `request` - The operation request data
    pub async fn execute<Op: SonosOperation>(
        &self,
        base_url: &Url,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let service_info = Op::SERVICE.info();
        let payload = Op::build_payload(request);

        let xml = self
            .soap_client
            .call(
                base_url,
                service_info.control_path,
                service_info.service_uri,
                Op::ACTION,
                &payload,
            )
            .await?;

        tracing::debug!(service = %Op::SERVICE, action = Op::ACTION, "operation succeeded");
        Op::parse_response(&xml)
    }

    /// Subscribe to events of `service`; returns the SID and granted timeout
    pub async fn subscribe(
        &self,
        base_url: &Url,
        service: Service,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<SubscriptionResponse> {
        let event_url = event_url(base_url, service)?;
        Ok(self
            .soap_client
            .subscribe(&event_url, callback_url, timeout_seconds)
            .await?)
    }

    /// Renew an existing subscription; returns the granted timeout
    pub async fn renew(
        &self,
        base_url: &Url,
        service: Service,
        sid: &str,
        timeout_seconds: u32,
    ) -> Result<u32> {
        let event_url = event_url(base_url, service)?;
        Ok(self
            .soap_client
            .renew_subscription(&event_url, sid, timeout_seconds)
            .await?)
    }

    /// Cancel a subscription
    pub async fn unsubscribe(&self, base_url: &Url, service: Service, sid: &str) -> Result<()> {
        let event_url = event_url(base_url, service)?;
        Ok(self.soap_client.unsubscribe(&event_url, sid).await?)
    }
}

/// Full event URL of `service` on the device at `base_url`
pub fn event_url(base_url: &Url, service: Service) -> Result<Url> {
    base_url
        .join(service.info().event_path)
        .map_err(|e| ApiError::InvalidParameter(e.to_string()))
}
