//! Error types for the discovery building blocks.

use thiserror::Error;

/// Error type for discovery operations.
///
/// Socket failures, description fetch failures and malformed descriptions.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Socket bind, send or receive failed
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    /// Description fetch failed at the HTTP layer
    #[error("HTTP error: {0}")]
    Http(String),

    /// Description XML could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A location or endpoint could not be turned into a URL
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(error: reqwest::Error) -> Self {
        DiscoveryError::Http(error.to_string())
    }
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
