//! AVTransport `LastChange` parser.
//!
//! The `LastChange` variable carries an escaped document of this shape:
//!
//! ```xml
//! <Event xmlns="urn:schemas-upnp-org:metadata-1-0/AVT/">
//!   <InstanceID val="0">
//!     <TransportState val="PLAYING"/>
//!     <CurrentTrackMetaData val="&lt;DIDL-Lite ...&gt;"/>
//!   </InstanceID>
//! </Event>
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::attributes::deserialize_val;
use crate::common::{xml_decode, DidlItem, DidlLite};
use crate::error::{ParseError, ParseResult};

#[derive(Debug, Deserialize)]
struct LastChangeEvent {
    #[serde(rename = "InstanceID", default)]
    instances: Vec<AVTransportLastChange>,
}

/// Transport state reported for one AVTransport instance.
///
/// Only variables that changed are present, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct AVTransportLastChange {
    /// Instance ID (always "0" on Sonos)
    #[serde(rename = "@val", default)]
    pub instance_id: String,

    /// PLAYING, PAUSED_PLAYBACK, STOPPED, TRANSITIONING
    #[serde(rename = "TransportState", default, deserialize_with = "deserialize_val")]
    pub transport_state: Option<String>,

    /// NORMAL, REPEAT_ALL, SHUFFLE, ...
    #[serde(rename = "CurrentPlayMode", default, deserialize_with = "deserialize_val")]
    pub current_play_mode: Option<String>,

    #[serde(rename = "CurrentCrossfadeMode", default, deserialize_with = "deserialize_val")]
    pub current_crossfade_mode: Option<String>,

    #[serde(rename = "NumberOfTracks", default, deserialize_with = "deserialize_val")]
    pub number_of_tracks: Option<String>,

    #[serde(rename = "CurrentTrack", default, deserialize_with = "deserialize_val")]
    pub current_track: Option<String>,

    #[serde(rename = "CurrentSection", default, deserialize_with = "deserialize_val")]
    pub current_section: Option<String>,

    #[serde(rename = "CurrentTrackURI", default, deserialize_with = "deserialize_val")]
    pub current_track_uri: Option<String>,

    #[serde(rename = "CurrentTrackDuration", default, deserialize_with = "deserialize_val")]
    pub current_track_duration: Option<String>,

    /// Raw DIDL-Lite; see [`AVTransportLastChange::current_track_metadata`]
    #[serde(rename = "CurrentTrackMetaData", default, deserialize_with = "deserialize_val")]
    pub current_track_metadata_raw: Option<String>,

    #[serde(rename = "NextTrackURI", default, deserialize_with = "deserialize_val")]
    pub next_track_uri: Option<String>,

    /// Raw DIDL-Lite; see [`AVTransportLastChange::next_track_metadata`]
    #[serde(rename = "NextTrackMetaData", default, deserialize_with = "deserialize_val")]
    pub next_track_metadata_raw: Option<String>,
}

impl AVTransportLastChange {
    /// Parse the unescaped `LastChange` document.
    ///
    /// The first `InstanceID` wins.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        let event: LastChangeEvent = xml_decode::parse(xml)?;
        event
            .instances
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::MissingRequiredElement("InstanceID".to_string()))
    }

    /// Decoded current track metadata, `None` when absent or empty.
    pub fn current_track_metadata(&self) -> Option<ParseResult<DidlLite>> {
        decode_metadata(self.current_track_metadata_raw.as_deref())
    }

    /// Decoded next track metadata, `None` when absent or empty.
    pub fn next_track_metadata(&self) -> Option<ParseResult<DidlLite>> {
        decode_metadata(self.next_track_metadata_raw.as_deref())
    }
}

fn decode_metadata(raw: Option<&str>) -> Option<ParseResult<DidlLite>> {
    raw.filter(|r| !r.trim().is_empty()).map(DidlLite::from_xml)
}

fn write_track(f: &mut fmt::Formatter<'_>, label: &str, item: &DidlItem) -> fmt::Result {
    writeln!(f, "{}>Title: {}", label, item.title().unwrap_or_default())?;
    writeln!(f, "{}>Album: {}", label, item.album().unwrap_or_default())?;
    writeln!(f, "{}>Creator: {}", label, item.creator().unwrap_or_default())?;
    writeln!(f, "{}>AlbumArtURI: {}", label, item.album_art_uri().unwrap_or_default())
}

/// Human readable summary; track metadata goes through the DIDL-Lite codec
/// and is skipped when it does not parse.
impl fmt::Display for AVTransportLastChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();

        writeln!(f, "TransportState: {}", field(&self.transport_state))?;
        writeln!(f, "CurrentPlayMode: {}", field(&self.current_play_mode))?;
        writeln!(f, "NumberOfTracks: {}", field(&self.number_of_tracks))?;
        writeln!(f, "CurrentTrack: {}", field(&self.current_track))?;
        writeln!(f, "CurrentTrackDuration: {}", field(&self.current_track_duration))?;
        writeln!(f, "CurrentTrackURI: {}", field(&self.current_track_uri))?;
        if let Some(Ok(didl)) = self.current_track_metadata() {
            if let Some(item) = didl.first_item() {
                write_track(f, "CurrentTrackMetaData", item)?;
            }
        }

        writeln!(f, "NextTrackURI: {}", field(&self.next_track_uri))?;
        if let Some(Ok(didl)) = self.next_track_metadata() {
            if let Some(item) = didl.first_item() {
                write_track(f, "NextTrackMetaData", item)?;
            }
        }
        Ok(())
    }
}
