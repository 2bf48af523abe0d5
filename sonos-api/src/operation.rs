use serde::Serialize;
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Base trait for all Sonos API operations
///
/// Defines the request/response pair of one SOAP action and how each side is
/// converted to and from the wire.
pub trait SonosOperation {
    /// The request type for this operation, must be serializable
    type Request: Serialize;

    /// The decoded response
    type Response;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Build the XML payload that goes inside the `<u:Action>` element
    fn build_payload(request: &Self::Request) -> String;

    /// Decode the `<ActionResponse>` element returned by the device
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Text of a required response argument
pub(crate) fn required_text(xml: &Element, name: &str) -> Result<String, ApiError> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|text| text.into_owned())
        .ok_or_else(|| ApiError::ParseError(format!("Missing {} element", name)))
}

/// Text of a numeric response argument
pub(crate) fn required_u32(xml: &Element, name: &str) -> Result<u32, ApiError> {
    let text = required_text(xml, name)?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::ParseError(format!("Invalid {} value: {}", name, text)))
}
