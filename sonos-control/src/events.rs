//! Events delivered to a zone player's sink, and the routing that gets them
//! there from the event server.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use callback_server::{EventRouter, NotificationPayload};
use sonos_api::{Service, ServiceEvent};

use crate::registry::Registry;
use crate::zone_player::ZonePlayer;

/// One decoded state change reported by a zone player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEvent {
    /// Serial number of the reporting zone player
    pub serial_number: String,
    pub service: Service,
    pub event: ServiceEvent,
}

impl fmt::Display for ZoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.serial_number, self.event)
    }
}

/// Routes notifications to registered zone players.
///
/// The `sn` query parameter selects the player; the request path selects the
/// service whose parser decodes the body.
pub(crate) struct RegistryRouter {
    registry: Arc<Registry>,
}

impl RegistryRouter {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventRouter for RegistryRouter {
    type Target = Arc<ZonePlayer>;

    async fn resolve(&self, serial_number: &str) -> Option<Arc<ZonePlayer>> {
        self.registry.get(serial_number)
    }

    async fn dispatch(&self, player: Arc<ZonePlayer>, payload: NotificationPayload) {
        let delivered = player.deliver(&payload.path, &payload.body_text());
        tracing::debug!(
            serial_number = %payload.serial_number,
            path = %payload.path,
            delivered,
            "notification dispatched"
        );
    }
}
