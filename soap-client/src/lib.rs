//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal async SOAP client for talking to UPnP zone
//! players. It also speaks the GENA subset used for event subscriptions:
//! SUBSCRIBE, renewal via SUBSCRIBE with a SID, and UNSUBSCRIBE.

mod error;

pub use error::SoapError;

use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use url::Url;
use xmltree::Element;

/// Timeout applied to every request made by [`SoapClient::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response from a UPnP subscription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionResponse {
    /// Subscription ID returned by the device, verbatim
    pub sid: String,
    /// Timeout granted by the device (in seconds)
    pub timeout_seconds: u32,
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
}

impl SoapClient {
    /// Create a new SOAP client with the default 10 second timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a SOAP client whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(?timeout, "HTTP client build failed, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self { http }
    }

    /// Wrap an existing HTTP client
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// The underlying HTTP client, shared with description fetches
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a SOAP request and return the parsed `<action>Response` element
    ///
    /// # Arguments
    /// * `base` - Device base URL (`http://host:port`)
    /// * `control_path` - Absolute control path (e.g. `/ZoneGroupTopology/Control`)
    /// * `service_uri` - Service URN used in the envelope and SOAPACTION header
    /// * `action` - Action name
    /// * `payload` - Serialized action arguments
    pub async fn call(
        &self,
        base: &Url,
        control_path: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let body = format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{service_uri}">{payload}</u:{action}></s:Body></s:Envelope>"#,
            action = action,
            service_uri = service_uri,
            payload = payload
        );

        let url = base
            .join(control_path)
            .map_err(|e| SoapError::InvalidUrl(e.to_string()))?;
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        tracing::debug!(%url, action, "sending SOAP request");

        let response = self
            .http
            .post(url)
            .header("Content-Type", "text/xml; charset=\"utf-8\"")
            .header("SOAPACTION", soap_action)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let xml_text = response.text().await?;

        let xml = match Element::parse(xml_text.as_bytes()) {
            Ok(xml) => xml,
            Err(e) if status.is_success() => return Err(SoapError::Parse(e.to_string())),
            Err(_) => {
                return Err(SoapError::Http {
                    status: status.as_u16(),
                    body: xml_text,
                })
            }
        };

        // Devices report faults with a 500 status, so the envelope wins over the status
        match Self::extract_response(&xml, action) {
            Err(SoapError::Parse(_)) if !status.is_success() => Err(SoapError::Http {
                status: status.as_u16(),
                body: xml_text,
            }),
            other => other,
        }
    }

    /// Subscribe to UPnP events on a service event endpoint
    ///
    /// Sends exactly HOST, CALLBACK, NT and TIMEOUT.
    ///
    /// # Arguments
    /// * `event_url` - Full event sub-URL of the service
    /// * `callback_url` - URL the device should NOTIFY
    /// * `timeout_seconds` - Requested lease in seconds
    pub async fn subscribe(
        &self,
        event_url: &Url,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<SubscriptionResponse, SoapError> {
        let response = self
            .http
            .request(gena_method(b"SUBSCRIBE")?, event_url.clone())
            .header("HOST", host_header(event_url)?)
            .header("CALLBACK", format!("<{}>", callback_url))
            .header("NT", "upnp:event")
            .header("TIMEOUT", format!("Second-{}", timeout_seconds))
            .send()
            .await?;

        let response = expect_ok(response).await?;

        let sid = header_value(&response, "SID")
            .ok_or_else(|| SoapError::Parse("Missing SID header in SUBSCRIBE response".to_string()))?;
        let timeout_seconds = granted_timeout(&response).unwrap_or(timeout_seconds);

        tracing::debug!(%event_url, %sid, timeout_seconds, "subscribed");

        Ok(SubscriptionResponse {
            sid,
            timeout_seconds,
        })
    }

    /// Renew an existing UPnP subscription
    ///
    /// Sends exactly HOST, SID and TIMEOUT. Returns the granted timeout.
    pub async fn renew_subscription(
        &self,
        event_url: &Url,
        sid: &str,
        timeout_seconds: u32,
    ) -> Result<u32, SoapError> {
        let response = self
            .http
            .request(gena_method(b"SUBSCRIBE")?, event_url.clone())
            .header("HOST", host_header(event_url)?)
            .header("SID", sid)
            .header("TIMEOUT", format!("Second-{}", timeout_seconds))
            .send()
            .await?;

        let response = expect_ok(response).await?;
        Ok(granted_timeout(&response).unwrap_or(timeout_seconds))
    }

    /// Cancel a UPnP subscription
    ///
    /// Sends exactly HOST and SID.
    pub async fn unsubscribe(&self, event_url: &Url, sid: &str) -> Result<(), SoapError> {
        let response = self
            .http
            .request(gena_method(b"UNSUBSCRIBE")?, event_url.clone())
            .header("HOST", host_header(event_url)?)
            .header("SID", sid)
            .send()
            .await?;

        expect_ok(response).await?;
        Ok(())
    }

    fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError"))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn gena_method(name: &[u8]) -> Result<Method, SoapError> {
    Method::from_bytes(name).map_err(|e| SoapError::Network(e.to_string()))
}

/// `host:port` of the event endpoint, as GENA expects in the HOST header
fn host_header(url: &Url) -> Result<String, SoapError> {
    let host = url
        .host_str()
        .ok_or_else(|| SoapError::InvalidUrl(url.to_string()))?;
    match url.port_or_known_default() {
        Some(port) => Ok(format!("{}:{}", host, port)),
        None => Ok(host.to_string()),
    }
}

async fn expect_ok(response: Response) -> Result<Response, SoapError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(SoapError::Http {
        status: status.as_u16(),
        body,
    })
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Parse a `Second-N` TIMEOUT header
fn granted_timeout(response: &Response) -> Option<u32> {
    parse_timeout(&header_value(response, "TIMEOUT")?)
}

fn parse_timeout(value: &str) -> Option<u32> {
    value.trim().strip_prefix("Second-")?.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_client_creation() {
        let _client = SoapClient::new();
        let _default_client = SoapClient::default();
        let _short = SoapClient::with_timeout(Duration::from_millis(250));
    }

    #[test]
    fn test_extract_response_with_valid_response() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:GetZoneGroupStateResponse xmlns:u="urn:schemas-upnp-org:service:ZoneGroupTopology:1">
                        <ZoneGroupState>&lt;ZoneGroups/&gt;</ZoneGroupState>
                    </u:GetZoneGroupStateResponse>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let response = SoapClient::extract_response(&xml, "GetZoneGroupState").unwrap();

        assert_eq!(response.name, "GetZoneGroupStateResponse");
        let state = response
            .get_child("ZoneGroupState")
            .and_then(|e| e.get_text())
            .unwrap();
        assert_eq!(state, "<ZoneGroups/>");
    }

    #[test]
    fn test_extract_response_with_soap_fault() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>401</errorCode>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match SoapClient::extract_response(&xml, "Play").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 401),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_soap_fault_with_default_error_code() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Server</faultcode>
                        <faultstring>Internal Error</faultstring>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match SoapClient::extract_response(&xml, "Play").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 500),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_body() {
        let xml_str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"></s:Envelope>"#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match SoapClient::extract_response(&xml, "Play").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing SOAP Body")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_action_response() {
        let xml_str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body></s:Body></s:Envelope>"#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match SoapClient::extract_response(&xml, "Play").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing PlayResponse element")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_host_header_includes_port() {
        let url = Url::parse("http://192.168.1.20:1400/MediaRenderer/AVTransport/Event").unwrap();
        assert_eq!(host_header(&url).unwrap(), "192.168.1.20:1400");

        let url = Url::parse("http://speaker.local/ZoneGroupTopology/Event").unwrap();
        assert_eq!(host_header(&url).unwrap(), "speaker.local:80");
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("Second-300"), Some(300));
        assert_eq!(parse_timeout(" Second-1800 "), Some(1800));
        assert_eq!(parse_timeout("infinite"), None);
        assert_eq!(parse_timeout("Second-"), None);
    }
}
