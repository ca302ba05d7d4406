//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur during telemetry setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging, usually because a global subscriber is
    /// already installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A log level name that is not recognised.
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
