//! Logging setup for applications embedding the control point
//!
//! Library code only emits `tracing` events. Binaries and tests choose where
//! they go by installing a subscriber through this module.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the [`LoggingMode`]
pub const LOG_MODE_ENV: &str = "SONOS_LOG_MODE";

/// Environment variable overriding the filter directive
pub const LOG_LEVEL_ENV: &str = "SONOS_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed
    Silent,
    /// Compact stderr output, `info` by default
    Development,
    /// Pretty output with thread ids and source locations, `debug` by default
    Debug,
}

impl LoggingMode {
    /// Mode named by `value` ("silent", "development", "debug"), if any.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silent" => Some(LoggingMode::Silent),
            "development" | "dev" => Some(LoggingMode::Development),
            "debug" => Some(LoggingMode::Debug),
            _ => None,
        }
    }

    fn default_directive(self) -> &'static str {
        match self {
            LoggingMode::Silent => "off",
            LoggingMode::Development => "info",
            LoggingMode::Debug => "debug",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter {directive:?}: {message}")]
    InvalidFilter { directive: String, message: String },
}

/// Install a global subscriber for `mode`.
///
/// The filter comes from `SONOS_LOG_LEVEL`, then `RUST_LOG`, then the mode's
/// default level. Fails if a subscriber is already installed.
///
/// ```rust,ignore
/// sonos_control::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(mode.default_directive())?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(mode.default_directive())?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize from `SONOS_LOG_MODE`; unset or unknown values mean silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LoggingMode::parse(&value))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

fn create_env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| default_directive.to_string());

    parse_filter(&directive)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Whether a global subscriber has been installed.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
