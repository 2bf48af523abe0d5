//! GENA property set envelope.
//!
//! Every event notification body has the same outer shape:
//!
//! ```xml
//! <e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0">
//!   <e:property><LastChange>...</LastChange></e:property>
//!   <e:property><ZoneGroupState>...</ZoneGroupState></e:property>
//! </e:propertyset>
//! ```
//!
//! The variable names differ per service, so the envelope is read with a
//! streaming reader rather than a fixed serde struct.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ParseError, ParseResult};

/// One named state variable carried by a property set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Variable name without namespace prefix
    pub name: String,
    /// Unescaped text content; may itself be an XML document
    pub value: String,
}

/// The decoded `propertyset` envelope, variables in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertySet {
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Parse an event notification body.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        if xml.trim().is_empty() {
            return Err(ParseError::InvalidXmlStructure("empty event body".to_string()));
        }

        let mut reader = Reader::from_str(xml);
        let mut properties = Vec::new();
        let mut seen_root = false;
        // depth 1 = propertyset, 2 = property, 3 = variable
        let mut depth = 0usize;
        let mut current: Option<Property> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ParseError::InvalidXmlStructure(e.to_string()))?;

            match event {
                Event::Start(start) => {
                    depth += 1;
                    let name = local_name(start.local_name().as_ref())?;
                    match depth {
                        1 => expect_root(&name, &mut seen_root)?,
                        3 => {
                            current = Some(Property {
                                name,
                                value: String::new(),
                            })
                        }
                        _ => {}
                    }
                }
                Event::Empty(start) => {
                    let name = local_name(start.local_name().as_ref())?;
                    match depth + 1 {
                        1 => expect_root(&name, &mut seen_root)?,
                        3 => properties.push(Property {
                            name,
                            value: String::new(),
                        }),
                        _ => {}
                    }
                }
                Event::Text(text) if depth >= 3 => {
                    if let Some(property) = current.as_mut() {
                        let unescaped = text
                            .unescape()
                            .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
                        property.value.push_str(&unescaped);
                    }
                }
                Event::CData(data) if depth >= 3 => {
                    if let Some(property) = current.as_mut() {
                        let raw = std::str::from_utf8(&data)
                            .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
                        property.value.push_str(raw);
                    }
                }
                Event::End(_) => {
                    if depth == 3 {
                        if let Some(property) = current.take() {
                            properties.push(property);
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof if depth > 0 => {
                    return Err(ParseError::InvalidXmlStructure(
                        "unexpected end of document".to_string(),
                    ))
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(ParseError::MissingRequiredElement("propertyset".to_string()));
        }

        Ok(Self { properties })
    }

    /// Value of the first variable called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl IntoIterator for PropertySet {
    type Item = Property;
    type IntoIter = std::vec::IntoIter<Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

fn expect_root(name: &str, seen_root: &mut bool) -> ParseResult<()> {
    if name != "propertyset" {
        return Err(ParseError::InvalidXmlStructure(format!(
            "expected propertyset root, found {}",
            name
        )));
    }
    *seen_root = true;
    Ok(())
}

fn local_name(bytes: &[u8]) -> ParseResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}
