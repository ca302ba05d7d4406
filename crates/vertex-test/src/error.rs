//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading its response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The URI could not be parsed.
    #[error("invalid uri {uri:?}: {reason}")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Parser message.
        reason: String,
    },

    /// A header name or value is not valid HTTP.
    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    /// A form or query value could not be urlencoded.
    #[error("form encoding failed: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body could not be read.
    #[error("body read error: {0}")]
    BodyRead(String),
}
