//! XML decoding utilities for UPnP payloads.
//!
//! Sonos devices mix namespace prefixes freely (`e:`, `dc:`, `upnp:`, `r:`) and
//! nest escaped XML documents inside attribute values and element text. The
//! helpers here normalise a document to prefix-free element and attribute
//! names so the serde structs elsewhere in the crate can stay simple.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::de::DeserializeOwned;

use crate::error::{ParseError, ParseResult};

/// Parse XML string into a deserializable type with namespace stripping.
///
/// Empty or whitespace-only input is rejected before deserialization.
pub fn parse<T: DeserializeOwned>(xml: &str) -> ParseResult<T> {
    let stripped = strip_namespaces(xml)?;
    quick_xml::de::from_str(&stripped)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

/// Strip namespace prefixes from element and attribute names.
///
/// `xmlns` declarations are dropped entirely. Text, CDATA and attribute
/// values are copied through still escaped. Mismatched end tags are an error.
///
/// # Example
///
/// Input: `<e:propertyset xmlns:e="urn:x"><dc:title>Song</dc:title></e:propertyset>`
/// Output: `<propertyset><title>Song</title></propertyset>`
pub fn strip_namespaces(xml: &str) -> ParseResult<String> {
    if xml.trim().is_empty() {
        return Err(ParseError::InvalidXmlStructure("empty document".to_string()));
    }

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::InvalidXmlStructure(e.to_string()))?;

        let stripped = match event {
            Event::Start(start) => {
                depth += 1;
                Event::Start(strip_start(&start)?)
            }
            Event::Empty(start) => Event::Empty(strip_start(&start)?),
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                let name = utf8(end.local_name().as_ref())?.to_owned();
                Event::End(BytesEnd::new(name))
            }
            Event::Eof if depth > 0 => {
                return Err(ParseError::InvalidXmlStructure(
                    "unexpected end of document".to_string(),
                ))
            }
            Event::Eof => break,
            other => other,
        };

        writer
            .write_event(stripped)
            .map_err(|e| ParseError::NamespaceProcessingFailed(e.to_string()))?;
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| ParseError::NamespaceProcessingFailed(e.to_string()))
}

/// Local name of the document's root element.
pub fn root_name(xml: &str) -> ParseResult<String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader
            .read_event()
            .map_err(|e| ParseError::InvalidXmlStructure(e.to_string()))?
        {
            Event::Start(start) | Event::Empty(start) => {
                return Ok(utf8(start.local_name().as_ref())?.to_owned());
            }
            Event::Eof => {
                return Err(ParseError::InvalidXmlStructure(
                    "document has no root element".to_string(),
                ))
            }
            _ => {}
        }
    }
}

/// Unescape element text or an attribute value holding nested XML.
pub fn unescape(raw: &str) -> ParseResult<Cow<'_, str>> {
    quick_xml::escape::unescape(raw).map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

fn strip_start(start: &BytesStart<'_>) -> ParseResult<BytesStart<'static>> {
    let name = utf8(start.local_name().as_ref())?.to_owned();
    let mut stripped = BytesStart::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::NamespaceProcessingFailed(e.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        stripped.push_attribute((attr.key.local_name().as_ref(), attr.value.as_ref()));
    }

    Ok(stripped)
}

fn utf8(bytes: &[u8]) -> ParseResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::NamespaceProcessingFailed(e.to_string()))
}
