//! # sonos-parser
//!
//! XML parsing for Sonos UPnP payloads: GENA property sets, `LastChange`
//! documents, zone group topology and DIDL-Lite metadata.
//!
//! ## Usage
//!
//! ### Top-level convenience access
//! ```rust,ignore
//! use sonos_parser::{PropertySet, AVTransportLastChange};
//!
//! let set = PropertySet::from_xml(body)?;
//! if let Some(raw) = set.get("LastChange") {
//!     let change = AVTransportLastChange::from_xml(raw)?;
//! }
//! ```
//!
//! ### Service-specific access
//! ```rust,ignore
//! use sonos_parser::services::zone_group_topology::ZoneGroupState;
//! ```

pub mod common;
pub mod error;
pub mod services;

pub use error::{ParseError, ParseResult};

pub use common::{
    parse_metadata, ChannelValue, DidlItem, DidlLite, DidlResource, Property, PropertySet,
    ValueAttribute,
};

pub use services::av_transport::AVTransportLastChange;
pub use services::rendering_control::RenderingControlLastChange;
pub use services::zone_group_topology::{ZoneGroup, ZoneGroupMember, ZoneGroupState};
