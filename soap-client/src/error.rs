//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP and GENA communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or transport failure (connect, timeout, body read)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error, or a response missing a required part
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    Fault(u16),

    /// The device answered with an unexpected HTTP status.
    ///
    /// `body` carries the response body text verbatim.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The target URL has no host component
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for SoapError {
    fn from(error: reqwest::Error) -> Self {
        SoapError::Network(error.to_string())
    }
}
