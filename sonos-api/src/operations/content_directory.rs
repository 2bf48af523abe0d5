//! Browse operation for the ContentDirectory service

use quick_xml::escape::escape;
use serde::Serialize;
use sonos_parser::DidlLite;
use xmltree::Element;

use crate::operation::{required_text, required_u32};
use crate::{ApiError, Service, SonosOperation};

/// Browse operation
pub struct BrowseOperation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrowseFlag {
    BrowseMetadata,
    BrowseDirectChildren,
}

impl BrowseFlag {
    fn as_str(&self) -> &'static str {
        match self {
            BrowseFlag::BrowseMetadata => "BrowseMetadata",
            BrowseFlag::BrowseDirectChildren => "BrowseDirectChildren",
        }
    }
}

/// Request for Browse
#[derive(Debug, Clone, Serialize)]
pub struct BrowseRequest {
    /// e.g. `Q:0` for the queue, `A:ARTIST` for the library artists
    pub object_id: String,
    pub browse_flag: BrowseFlag,
    pub filter: String,
    pub starting_index: u32,
    /// 0 asks for everything
    pub requested_count: u32,
    pub sort_criteria: String,
}

impl BrowseRequest {
    /// Direct children of `object_id`, all fields, everything at once
    pub fn children(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::BrowseDirectChildren,
            filter: "*".to_string(),
            starting_index: 0,
            requested_count: 0,
            sort_criteria: String::new(),
        }
    }
}

/// Response for Browse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResponse {
    pub result: DidlLite,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

impl SonosOperation for BrowseOperation {
    type Request = BrowseRequest;
    type Response = BrowseResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "Browse";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<ObjectID>{}</ObjectID><BrowseFlag>{}</BrowseFlag><Filter>{}</Filter><StartingIndex>{}</StartingIndex><RequestedCount>{}</RequestedCount><SortCriteria>{}</SortCriteria>",
            escape(&request.object_id),
            request.browse_flag.as_str(),
            escape(&request.filter),
            request.starting_index,
            request.requested_count,
            escape(&request.sort_criteria),
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let raw = required_text(xml, "Result")?;
        let result = DidlLite::from_xml(&raw)?;

        Ok(BrowseResponse {
            result,
            number_returned: required_u32(xml, "NumberReturned")?,
            total_matches: required_u32(xml, "TotalMatches")?,
            update_id: required_u32(xml, "UpdateID").unwrap_or_default(),
        })
    }
}
