//! A Sonos zone player as seen by the control point.

use std::collections::HashMap;
use std::net::IpAddr;

use sonos_api::operations::{GetZoneGroupStateOperation, GetZoneGroupStateRequest};
use sonos_api::{Service, SonosClient};
use sonos_discovery::{base_url, fetch_description, location_for_endpoint, DeviceDescription};
use sonos_parser::ZoneGroupState;
use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;
use crate::events::ZoneEvent;

/// Where a zone player's decoded events go.
pub type EventSink = mpsc::UnboundedSender<ZoneEvent>;

/// A zone player: identity from its device description, the fourteen
/// services every player exposes, and the sink its events are sent to.
///
/// Coordinator status is not stored. Every call to
/// [`ZonePlayer::is_coordinator`] asks the player for the current topology.
#[derive(Debug)]
pub struct ZonePlayer {
    description: DeviceDescription,
    location: Url,
    base_url: Url,
    client: SonosClient,
    event_paths: HashMap<&'static str, Service>,
    sink: EventSink,
}

impl ZonePlayer {
    /// Build from an already fetched description.
    pub fn new(
        location: Url,
        description: DeviceDescription,
        client: SonosClient,
        sink: EventSink,
    ) -> Result<Self> {
        let base_url = base_url(&location)?;
        let event_paths = Service::ALL
            .iter()
            .map(|service| (service.info().event_path, *service))
            .collect();

        Ok(Self {
            description,
            location,
            base_url,
            client,
            event_paths,
            sink,
        })
    }

    /// Fetch the description at `location` and build the player.
    pub async fn from_location(location: &Url, client: SonosClient, sink: EventSink) -> Result<Self> {
        let description = fetch_description(client.soap_client().http(), location).await?;
        Self::new(location.clone(), description, client, sink)
    }

    /// Build the player listening at `ip` on the standard port.
    pub async fn from_endpoint(ip: IpAddr, client: SonosClient, sink: EventSink) -> Result<Self> {
        let location = location_for_endpoint(ip)?;
        Self::from_location(&location, client, sink).await
    }

    /// `serialNum` from the description, the registry key
    pub fn serial_number(&self) -> &str {
        &self.description.serial_num
    }

    /// `uuid:RINCON_...`
    pub fn udn(&self) -> &str {
        &self.description.udn
    }

    pub fn room_name(&self) -> &str {
        &self.description.room_name
    }

    pub fn model_name(&self) -> &str {
        &self.description.model_name
    }

    pub fn hardware_version(&self) -> &str {
        &self.description.hardware_version
    }

    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    /// Description URL the player was built from
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// `http://host:port/`, the root for control and event paths
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn client(&self) -> &SonosClient {
        &self.client
    }

    pub fn event_sink(&self) -> &EventSink {
        &self.sink
    }

    /// Current household topology as this player reports it.
    pub async fn zone_group_state(&self) -> Result<ZoneGroupState> {
        let response = self
            .client
            .execute::<GetZoneGroupStateOperation>(&self.base_url, &GetZoneGroupStateRequest)
            .await?;
        Ok(response.zone_group_state)
    }

    /// Whether this player currently coordinates a zone group.
    ///
    /// Any failure to fetch or decode the topology counts as "no".
    pub async fn is_coordinator(&self) -> bool {
        match self.zone_group_state().await {
            Ok(state) => state.is_coordinator(self.udn()),
            Err(e) => {
                tracing::debug!(
                    serial_number = self.serial_number(),
                    "coordinator check failed: {}",
                    e
                );
                false
            }
        }
    }

    /// Service whose event path is exactly `path`.
    pub fn service_for_event_path(&self, path: &str) -> Option<Service> {
        self.event_paths.get(path).copied()
    }

    /// Decode a notification body received on `path` and send the events to
    /// the sink in document order. Returns how many were sent.
    pub(crate) fn deliver(&self, path: &str, body: &str) -> usize {
        let Some(service) = self.service_for_event_path(path) else {
            tracing::debug!(serial_number = self.serial_number(), path, "no service for event path");
            return 0;
        };

        let events = match service.parse_event(body) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    serial_number = self.serial_number(),
                    %service,
                    "failed to parse event: {}",
                    e
                );
                return 0;
            }
        };

        let mut delivered = 0;
        for event in events {
            let zone_event = ZoneEvent {
                serial_number: self.serial_number().to_string(),
                service,
                event,
            };
            if self.sink.send(zone_event).is_err() {
                tracing::debug!(serial_number = self.serial_number(), "event sink closed");
                break;
            }
            delivered += 1;
        }
        delivered
    }
}
