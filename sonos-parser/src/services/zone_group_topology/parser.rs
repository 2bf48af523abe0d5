//! ZoneGroupTopology state parser
//!
//! Current firmware wraps the groups in a `ZoneGroupState` root:
//!
//! ```xml
//! <ZoneGroupState>
//!   <ZoneGroups>
//!     <ZoneGroup Coordinator="RINCON_1" ID="RINCON_1:42">
//!       <ZoneGroupMember UUID="RINCON_1" Location="http://..." ZoneName="Kitchen"/>
//!     </ZoneGroup>
//!   </ZoneGroups>
//!   <VanishedDevices/>
//! </ZoneGroupState>
//! ```
//!
//! Older firmware sends the bare `ZoneGroups` element. Both are accepted.

use serde::{Deserialize, Serialize};

use crate::common::xml_decode;
use crate::error::{ParseError, ParseResult};

#[derive(Debug, Deserialize)]
struct StateRoot {
    #[serde(rename = "ZoneGroups", default)]
    zone_groups: GroupsRoot,
}

#[derive(Debug, Default, Deserialize)]
struct GroupsRoot {
    #[serde(rename = "ZoneGroup", default)]
    zone_groups: Vec<ZoneGroup>,
}

/// Decoded topology: every zone group in the household.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ZoneGroupState {
    pub zone_groups: Vec<ZoneGroup>,
}

/// A set of zone players playing in sync under one coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ZoneGroup {
    /// Coordinator serial number, without the `uuid:` prefix
    #[serde(rename = "@Coordinator", default)]
    pub coordinator: String,

    #[serde(rename = "@ID", default)]
    pub id: String,

    #[serde(rename = "ZoneGroupMember", default)]
    pub members: Vec<ZoneGroupMember>,
}

/// A zone player that belongs to a group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ZoneGroupMember {
    /// RINCON_... serial number
    #[serde(rename = "@UUID", default)]
    pub uuid: String,

    /// Device description URL
    #[serde(rename = "@Location", default)]
    pub location: String,

    #[serde(rename = "@ZoneName", default)]
    pub zone_name: String,

    #[serde(rename = "@SoftwareVersion", default)]
    pub software_version: Option<String>,

    /// Set on satellite and bonded members hidden from the room list
    #[serde(rename = "@Invisible", default)]
    pub invisible: Option<String>,
}

impl ZoneGroupState {
    /// Parse the unescaped topology document.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        let zone_groups = match xml_decode::root_name(xml)?.as_str() {
            "ZoneGroupState" => {
                let root: StateRoot = xml_decode::parse(xml)?;
                root.zone_groups.zone_groups
            }
            "ZoneGroups" => {
                let root: GroupsRoot = xml_decode::parse(xml)?;
                root.zone_groups
            }
            other => {
                return Err(ParseError::InvalidXmlStructure(format!(
                    "expected ZoneGroupState or ZoneGroups root, found {}",
                    other
                )))
            }
        };

        Ok(Self { zone_groups })
    }

    /// Whether `udn` (`uuid:RINCON_...`) coordinates any group.
    pub fn is_coordinator(&self, udn: &str) -> bool {
        self.zone_groups
            .iter()
            .any(|group| udn.strip_prefix("uuid:") == Some(group.coordinator.as_str()))
    }

    /// Group whose members include `serial_number`.
    pub fn group_containing(&self, serial_number: &str) -> Option<&ZoneGroup> {
        self.zone_groups
            .iter()
            .find(|group| group.members.iter().any(|m| m.uuid == serial_number))
    }

    pub fn member_count(&self) -> usize {
        self.zone_groups.iter().map(|g| g.members.len()).sum()
    }
}
