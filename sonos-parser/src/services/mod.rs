//! Service-specific parsers organized by UPnP service type
//!
//! - [`av_transport`]: AVTransport `LastChange` documents
//! - [`rendering_control`]: RenderingControl `LastChange` documents
//! - [`zone_group_topology`]: zone group state
//!
//! Services without a structured payload are covered by
//! [`crate::common::PropertySet`] alone.

pub mod av_transport;
pub mod rendering_control;
pub mod zone_group_topology;
