//! AVTransport service parsing
//!
//! The AVTransport service reports playback state through a single
//! `LastChange` variable whose value is an escaped XML document. Track
//! metadata inside it is a further escaped DIDL-Lite document.

pub mod parser;

pub use parser::AVTransportLastChange;
