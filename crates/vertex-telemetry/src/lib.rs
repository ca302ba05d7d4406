//! Logging and metrics setup for Vertex services.
//!
//! - [`logging`] installs a `tracing-subscriber` stack with JSON or pretty
//!   output and maps configuration level names (`DEBUG` .. `CRITICAL`) onto
//!   tracing filters.
//! - [`metrics`] records request counts, latencies and limiter state through
//!   the `metrics` facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use vertex_telemetry::{init_telemetry, LogConfig, LogLevel};
//!
//! init_telemetry(&LogConfig::production().with_level(LogLevel::Warn))?;
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogLevel};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and registers metric descriptions.
///
/// # Errors
///
/// Returns `TelemetryError` if logging fails to initialize.
pub fn init_telemetry(config: &LogConfig) -> TelemetryResult<()> {
    init_logging(config)?;
    metrics::describe_metrics();
    Ok(())
}
