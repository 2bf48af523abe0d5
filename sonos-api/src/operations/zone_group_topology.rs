//! GetZoneGroupState operation for the ZoneGroupTopology service

use serde::Serialize;
use sonos_parser::ZoneGroupState;
use xmltree::Element;

use crate::operation::required_text;
use crate::{ApiError, Service, SonosOperation};

/// GetZoneGroupState operation
pub struct GetZoneGroupStateOperation;

/// Request for GetZoneGroupState (no arguments)
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetZoneGroupStateRequest;

/// Response for GetZoneGroupState
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetZoneGroupStateResponse {
    pub zone_group_state: ZoneGroupState,
}

impl SonosOperation for GetZoneGroupStateOperation {
    type Request = GetZoneGroupStateRequest;
    type Response = GetZoneGroupStateResponse;

    const SERVICE: Service = Service::ZoneGroupTopology;
    const ACTION: &'static str = "GetZoneGroupState";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        // The output argument is itself an escaped document
        let raw = required_text(xml, "ZoneGroupState")?;
        let zone_group_state = ZoneGroupState::from_xml(&raw)?;

        Ok(GetZoneGroupStateResponse { zone_group_state })
    }
}
