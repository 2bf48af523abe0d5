//! Typed access to the UPnP services of a Sonos zone player
//!
//! - [`Service`] describes the fourteen services and where they live
//! - [`ServiceEvent`] is what a NOTIFY body decodes into
//! - [`SonosOperation`] and [`SonosClient`] run SOAP actions and GENA
//!   subscriptions over the private `soap-client` crate

pub mod client;
pub mod error;
pub mod events;
pub mod operation;
pub mod operations;
pub mod service;

pub use client::{event_url, SonosClient};
pub use error::{ApiError, Result};
pub use events::{
    AVTransportEvent, PropertyChange, RenderingControlEvent, ServiceEvent, ZoneGroupTopologyEvent,
};
pub use operation::SonosOperation;
pub use service::{Service, ServiceInfo};
pub use soap_client::SubscriptionResponse;
