//! DIDL-Lite media metadata codec.
//!
//! DIDL-Lite documents show up escaped inside AVTransport `LastChange` events
//! (`CurrentTrackMetaData`, `NextTrackMetaData`) and as the `Result` of
//! ContentDirectory browse responses.
//!
//! ```xml
//! <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
//!   <item id="-1" parentID="-1">
//!     <dc:title>Song Title</dc:title>
//!     <dc:creator>Artist Name</dc:creator>
//!     <upnp:album>Album Name</upnp:album>
//!     <res duration="0:03:58">uri</res>
//!   </item>
//! </DIDL-Lite>
//! ```
//!
//! Title, creator, album and album art may legally repeat, so each is a list.

use std::fmt::Write as _;

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::common::xml_decode;
use crate::error::{ParseError, ParseResult};

const DIDL_OPEN: &str = concat!(
    r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/""#,
    r#" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/""#,
    r#" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#,
);
const DIDL_CLOSE: &str = "</DIDL-Lite>";

/// DIDL-Lite root: the items and containers of one metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DidlLite {
    #[serde(rename = "item", default)]
    pub items: Vec<DidlItem>,

    #[serde(rename = "container", default)]
    pub containers: Vec<DidlItem>,
}

impl DidlLite {
    /// Parse DIDL-Lite XML content.
    ///
    /// Empty input, a root other than `DIDL-Lite` and malformed markup are
    /// all parse failures.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        let root = xml_decode::root_name(xml)?;
        if root != "DIDL-Lite" {
            return Err(ParseError::InvalidXmlStructure(format!(
                "expected DIDL-Lite root, found {}",
                root
            )));
        }
        xml_decode::parse(xml)
    }

    /// Render as namespaced DIDL-Lite XML. Containers precede items.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(DIDL_OPEN);
        for container in &self.containers {
            container.render("container", &mut out);
        }
        for item in &self.items {
            item.render("item", &mut out);
        }
        out.push_str(DIDL_CLOSE);
        out
    }

    /// First item, which is the track for transport metadata.
    pub fn first_item(&self) -> Option<&DidlItem> {
        self.items.first()
    }
}

/// Parse a raw metadata string into its ordered item records.
pub fn parse_metadata(raw: &str) -> ParseResult<Vec<DidlItem>> {
    DidlLite::from_xml(raw).map(|didl| didl.items)
}

/// An `item` or `container` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DidlItem {
    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@parentID", default)]
    pub parent_id: String,

    #[serde(rename = "@restricted", default)]
    pub restricted: Option<String>,

    #[serde(rename = "title", default)]
    pub titles: Vec<String>,

    #[serde(rename = "creator", default)]
    pub creators: Vec<String>,

    #[serde(rename = "album", default)]
    pub albums: Vec<String>,

    #[serde(rename = "albumArtURI", default)]
    pub album_art_uris: Vec<String>,

    /// e.g. `object.item.audioItem.musicTrack`
    #[serde(rename = "class", default)]
    pub class: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<DidlResource>,

    /// Radio stream "now playing" text
    #[serde(rename = "streamContent", default)]
    pub stream_content: Option<String>,
}

impl DidlItem {
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    pub fn creator(&self) -> Option<&str> {
        self.creators.first().map(String::as_str)
    }

    pub fn album(&self) -> Option<&str> {
        self.albums.first().map(String::as_str)
    }

    pub fn album_art_uri(&self) -> Option<&str> {
        self.album_art_uris.first().map(String::as_str)
    }

    fn render(&self, tag: &str, out: &mut String) {
        let _ = write!(
            out,
            r#"<{} id="{}" parentID="{}""#,
            tag,
            escape(&self.id),
            escape(&self.parent_id)
        );
        if let Some(restricted) = &self.restricted {
            let _ = write!(out, r#" restricted="{}""#, escape(restricted));
        }
        out.push('>');

        for (element, values) in [
            ("dc:title", &self.titles),
            ("dc:creator", &self.creators),
            ("upnp:album", &self.albums),
            ("upnp:albumArtURI", &self.album_art_uris),
        ] {
            for value in values {
                let _ = write!(out, "<{0}>{1}</{0}>", element, escape(value));
            }
        }
        if let Some(class) = &self.class {
            let _ = write!(out, "<upnp:class>{}</upnp:class>", escape(class));
        }
        for resource in &self.resources {
            resource.render(out);
        }
        if let Some(stream_content) = &self.stream_content {
            let _ = write!(
                out,
                "<r:streamContent>{}</r:streamContent>",
                escape(stream_content)
            );
        }

        let _ = write!(out, "</{}>", tag);
    }
}

/// Resource element containing the playable URI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DidlResource {
    /// Duration in H:MM:SS format
    #[serde(rename = "@duration", default)]
    pub duration: Option<String>,

    #[serde(rename = "@protocolInfo", default)]
    pub protocol_info: Option<String>,

    #[serde(rename = "$value", default)]
    pub uri: Option<String>,
}

impl DidlResource {
    fn render(&self, out: &mut String) {
        out.push_str("<res");
        if let Some(protocol_info) = &self.protocol_info {
            let _ = write!(out, r#" protocolInfo="{}""#, escape(protocol_info));
        }
        if let Some(duration) = &self.duration {
            let _ = write!(out, r#" duration="{}""#, escape(duration));
        }
        out.push('>');
        if let Some(uri) = &self.uri {
            out.push_str(&escape(uri));
        }
        out.push_str("</res>");
    }
}
