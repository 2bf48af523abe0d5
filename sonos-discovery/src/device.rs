//! Device description parsing and retrieval.
//!
//! Every zone player serves a UPnP device description at
//! `http://<ip>:1400/xml/device_description.xml`. It names the device's
//! serial number, UDN and room.

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;
use url::Url;

use crate::error::{DiscoveryError, Result};

/// HTTP port every zone player listens on
pub const DEVICE_PORT: u16 = 1400;

/// Path of the device description relative to the device base URL
pub const DESCRIPTION_PATH: &str = "/xml/device_description.xml";

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
struct Root {
    device: DeviceDescription,
}

/// Device description parsed from XML.
///
/// Only the root device is read; the embedded MediaRenderer and MediaServer
/// devices are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model_name: String,
    pub model_number: Option<String>,
    #[serde(default)]
    pub hardware_version: String,
    pub software_version: Option<String>,
    /// e.g. `00-0E-58-28-3B-4C:5`
    pub serial_num: String,
    /// e.g. `uuid:RINCON_000E58283B4C01400`
    #[serde(rename = "UDN")]
    pub udn: String,
    #[serde(default)]
    pub room_name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub service_list: ServiceList,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceEntry>,
}

/// A `<service>` entry of the root device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "serviceId", default)]
    pub service_id: String,
    #[serde(rename = "controlURL", default)]
    pub control_url: String,
    #[serde(rename = "eventSubURL", default)]
    pub event_sub_url: String,
}

impl DeviceDescription {
    /// Parse device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or lacks
    /// `serialNum` or `UDN`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml).map_err(|e| {
            DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e))
        })?;

        Ok(root.device)
    }

    /// Whether the description looks like a Sonos zone player.
    pub fn is_sonos_device(&self) -> bool {
        self.manufacturer.to_lowercase().contains("sonos")
            || self.device_type.contains("ZonePlayer")
    }
}

/// Fetch and parse the description at `location`.
pub async fn fetch_description(http: &reqwest::Client, location: &Url) -> Result<DeviceDescription> {
    tracing::debug!(%location, "fetching device description");

    let response = http.get(location.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::Http(format!(
            "{} returned HTTP {}",
            location,
            status.as_u16()
        )));
    }

    let body = response.text().await?;
    DeviceDescription::from_xml(&body)
}

/// Description URL of the zone player at `ip`.
pub fn location_for_endpoint(ip: IpAddr) -> Result<Url> {
    let url = format!("http://{}{}", SocketAddr::new(ip, DEVICE_PORT), DESCRIPTION_PATH);
    Url::parse(&url).map_err(|e| DiscoveryError::InvalidLocation(e.to_string()))
}

/// `scheme://host:port` of a description location.
pub fn base_url(location: &Url) -> Result<Url> {
    if location.host_str().is_none() {
        return Err(DiscoveryError::InvalidLocation(location.to_string()));
    }
    let mut base = location.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}
