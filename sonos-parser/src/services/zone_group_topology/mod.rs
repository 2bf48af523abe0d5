//! ZoneGroupTopology service parsing
//!
//! The topology document arrives escaped twice over: once as the
//! `ZoneGroupState` event variable and once as the `ZoneGroupState` output
//! argument of `GetZoneGroupState`. Either way the unescaped text is handed to
//! [`ZoneGroupState::from_xml`].
//!
//! ```rust,ignore
//! use sonos_parser::services::zone_group_topology::ZoneGroupState;
//!
//! let state = ZoneGroupState::from_xml(xml_content)?;
//! if state.is_coordinator("uuid:RINCON_000E58A0123401400") {
//!     // ...
//! }
//! ```

pub mod parser;

pub use parser::{ZoneGroup, ZoneGroupMember, ZoneGroupState};
