//! Event ingest server for the Sonos control point.
//!
//! Zone players deliver UPnP event notifications as HTTP requests to the
//! callback URL given at subscription time. That URL carries the zone
//! player's serial number in an `sn` query parameter; this crate accepts
//! those requests and hands each one to an [`EventRouter`] without parsing
//! the body.

pub mod router;
pub mod server;

pub use router::{ChannelRouter, EventRouter, NotificationPayload};
pub use server::{serial_from_query, CallbackError, CallbackServer, SERIAL_QUERY_PARAM};
