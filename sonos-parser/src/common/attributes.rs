//! Common attribute helper types for UPnP XML patterns.
//!
//! LastChange documents store every state variable in a `val` attribute of an
//! otherwise empty element, sometimes qualified by a `channel` attribute.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Represents an XML element with a `val` attribute.
///
/// ```xml
/// <TransportState val="PLAYING"/>
/// <CurrentTrackDuration val="0:03:57"/>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ValueAttribute {
    /// The value from the `val` attribute
    #[serde(rename = "@val", default)]
    pub val: String,
}

/// A `val` attribute qualified by a `channel`, as RenderingControl reports it.
///
/// ```xml
/// <Volume channel="Master" val="25"/>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ChannelValue {
    #[serde(rename = "@channel", default)]
    pub channel: String,

    #[serde(rename = "@val", default)]
    pub val: String,
}

/// `deserialize_with` helper flattening `<X val="..."/>` into `Option<String>`.
///
/// Pair it with `#[serde(default)]` so absent elements become `None`.
pub fn deserialize_val<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    ValueAttribute::deserialize(deserializer).map(|attr| Some(attr.val))
}
