//! Common utilities and data structures shared across UPnP services
//!
//! - [`xml_decode`]: namespace stripping and serde entry point
//! - [`attributes`]: helper types for `val`/`channel` attribute patterns
//! - [`property_set`]: the GENA event envelope
//! - [`didl`]: DIDL-Lite media metadata codec

pub mod attributes;
pub mod didl;
pub mod property_set;
pub mod xml_decode;

pub use attributes::{ChannelValue, ValueAttribute};
pub use didl::{parse_metadata, DidlItem, DidlLite, DidlResource};
pub use property_set::{Property, PropertySet};
