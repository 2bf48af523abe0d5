//! Sonos control point
//!
//! Finds group coordinators on the local network, keeps them in a registry,
//! manages GENA event subscriptions against them and turns the notifications
//! they send back into typed [`ZoneEvent`]s.
//!
//! - [`ControlPoint`] owns the discovery socket and the event server
//! - [`ZonePlayer`] is one device and the sink its events go to
//! - [`Registry`] maps serial numbers to registered coordinators
//! - [`Subscription`] is a caller-renewed event lease

pub mod config;
pub mod control_point;
mod discovery;
pub mod error;
pub mod events;
pub mod logging;
pub mod registry;
pub mod subscription;
pub mod zone_player;

pub use config::ControlPointConfig;
pub use control_point::ControlPoint;
pub use error::{ControlPointError, Result};
pub use events::ZoneEvent;
pub use registry::Registry;
pub use subscription::{callback_url, Subscription};
pub use zone_player::{EventSink, ZonePlayer};

pub use sonos_api::{Service, ServiceEvent};
