//! Building blocks for finding Sonos zone players on a local network
//!
//! - [`ssdp`]: the `M-SEARCH` probe, response parsing and an async UDP socket
//! - [`device`]: fetching and decoding UPnP device descriptions
//!
//! The discovery loop itself (deadline handling, coordinator filtering,
//! deduplication) lives in the control point.
//!
//! ```no_run
//! use sonos_discovery::{parse_ssdp_response, SsdpSocket, MULTICAST_ADDR, ZONE_PLAYER_SEARCH_TARGET};
//!
//! # async fn run() -> sonos_discovery::Result<()> {
//! let socket = SsdpSocket::bind("0.0.0.0:0".parse().unwrap()).await?;
//! socket
//!     .send_probe(&[MULTICAST_ADDR.into()], ZONE_PLAYER_SEARCH_TARGET, 1)
//!     .await?;
//! let (text, _from) = socket.recv().await?;
//! if let Some(response) = parse_ssdp_response(&text) {
//!     println!("zone player at {}", response.location);
//! }
//! # Ok(())
//! # }
//! ```

pub mod device;
mod error;
pub mod ssdp;

pub use device::{
    base_url, fetch_description, location_for_endpoint, DeviceDescription, ServiceEntry,
    DESCRIPTION_PATH, DEVICE_PORT,
};
pub use error::{DiscoveryError, Result};
pub use ssdp::{
    build_probe, parse_ssdp_response, SsdpResponse, SsdpSocket, BROADCAST_ADDR, MULTICAST_ADDR,
    ZONE_PLAYER_SEARCH_TARGET,
};
