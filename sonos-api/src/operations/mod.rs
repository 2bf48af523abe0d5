//! Sonos API operations organized by service

pub mod content_directory;
pub mod zone_group_topology;

pub use content_directory::{BrowseFlag, BrowseOperation, BrowseRequest, BrowseResponse};
pub use zone_group_topology::{
    GetZoneGroupStateOperation, GetZoneGroupStateRequest, GetZoneGroupStateResponse,
};
