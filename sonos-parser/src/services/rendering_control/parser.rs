//! RenderingControl `LastChange` parser.
//!
//! ```xml
//! <Event xmlns="urn:schemas-upnp-org:metadata-1-0/RCS/">
//!   <InstanceID val="0">
//!     <Volume channel="Master" val="25"/>
//!     <Mute channel="Master" val="0"/>
//!     <Bass val="0"/>
//!   </InstanceID>
//! </Event>
//! ```

use serde::{Deserialize, Serialize};

use crate::common::attributes::{deserialize_val, ChannelValue};
use crate::common::xml_decode;
use crate::error::{ParseError, ParseResult};

#[derive(Debug, Deserialize)]
struct LastChangeEvent {
    #[serde(rename = "InstanceID", default)]
    instances: Vec<RenderingControlLastChange>,
}

/// Rendering state reported for one RenderingControl instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RenderingControlLastChange {
    #[serde(rename = "@val", default)]
    pub instance_id: String,

    #[serde(rename = "Volume", default)]
    pub volume: Vec<ChannelValue>,

    #[serde(rename = "Mute", default)]
    pub mute: Vec<ChannelValue>,

    #[serde(rename = "Bass", default, deserialize_with = "deserialize_val")]
    pub bass: Option<String>,

    #[serde(rename = "Treble", default, deserialize_with = "deserialize_val")]
    pub treble: Option<String>,

    #[serde(rename = "Loudness", default)]
    pub loudness: Vec<ChannelValue>,
}

impl RenderingControlLastChange {
    /// Parse the unescaped `LastChange` document. The first `InstanceID` wins.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        let event: LastChangeEvent = xml_decode::parse(xml)?;
        event
            .instances
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::MissingRequiredElement("InstanceID".to_string()))
    }

    /// Volume for a channel ("Master", "LF", "RF").
    pub fn volume(&self, channel: &str) -> Option<u8> {
        find_channel(&self.volume, channel).and_then(|v| v.parse().ok())
    }

    /// Mute flag for a channel.
    pub fn is_muted(&self, channel: &str) -> Option<bool> {
        find_channel(&self.mute, channel).map(|v| v == "1")
    }
}

fn find_channel<'a>(values: &'a [ChannelValue], channel: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|v| v.channel == channel)
        .map(|v| v.val.as_str())
}
