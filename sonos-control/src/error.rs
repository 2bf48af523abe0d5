use callback_server::CallbackError;
use sonos_api::ApiError;
use sonos_discovery::DiscoveryError;
use thiserror::Error;

/// Errors raised by the control point.
///
/// Registry outcomes (`NotCoordinator`, `AlreadyRegistered`, `NotFound`) are
/// domain errors; see [`ControlPointError::is_domain`]. Everything else is a
/// transport, parse or lifecycle failure.
#[derive(Error, Debug)]
pub enum ControlPointError {
    #[error("Zone player {0} is not a group coordinator")]
    NotCoordinator(String),

    #[error("Zone player {0} is already registered")]
    AlreadyRegistered(String),

    #[error("Zone player not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Event server error: {0}")]
    Server(#[from] CallbackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Timed out looking for room {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Control point is shut down")]
    Closed,
}

impl ControlPointError {
    /// Whether this is a registry outcome rather than a failure to talk to a
    /// device. Domain errors will not change by retrying.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ControlPointError::NotCoordinator(_)
                | ControlPointError::AlreadyRegistered(_)
                | ControlPointError::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ControlPointError>;
