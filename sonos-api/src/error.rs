use soap_client::SoapError;
use sonos_parser::ParseError;
use thiserror::Error;

/// High-level API errors for Sonos operations
///
/// Abstracts the SOAP and GENA transport details into failures a caller can
/// act on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, timeouts, DNS failures or an unreadable body.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered but the content could not be decoded into the
    /// expected shape. Covers SOAP bodies, event bodies and nested documents.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by device, carrying the UPnP error code
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),

    /// The device answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Invalid parameter value (including unusable URLs)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
            SoapError::Http { status, body } => ApiError::HttpStatus { status, body },
            SoapError::InvalidUrl(msg) => ApiError::InvalidParameter(msg),
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(error: ParseError) -> Self {
        ApiError::ParseError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_error_conversion() {
        let api_error: ApiError = SoapError::Network("connection timeout".to_string()).into();
        assert!(matches!(api_error, ApiError::NetworkError(_)));

        let api_error: ApiError = SoapError::Parse("invalid XML".to_string()).into();
        assert!(matches!(api_error, ApiError::ParseError(_)));

        let api_error: ApiError = SoapError::Fault(714).into();
        assert!(matches!(api_error, ApiError::SoapFault(714)));

        let api_error: ApiError = SoapError::Http {
            status: 412,
            body: "precondition failed".to_string(),
        }
        .into();
        assert!(matches!(api_error, ApiError::HttpStatus { status: 412, .. }));
    }

    #[test]
    fn test_parse_error_conversion() {
        let api_error: ApiError = ParseError::MissingRequiredElement("InstanceID".to_string()).into();
        assert_eq!(
            api_error.to_string(),
            "Parse error: Missing required element: InstanceID"
        );
    }

    #[test]
    fn test_error_display() {
        let network_err = ApiError::NetworkError("connection failed".to_string());
        assert_eq!(format!("{}", network_err), "Network error: connection failed");

        let soap_fault = ApiError::SoapFault(500);
        assert_eq!(format!("{}", soap_fault), "SOAP fault: error code 500");

        let http = ApiError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(http.to_string(), "HTTP 500: boom");
    }
}
