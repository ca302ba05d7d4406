//! Error types for the documentation crate.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize swagger document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A route method that Swagger paths cannot express.
    #[error("Unsupported method {method} on {path}")]
    UnsupportedMethod {
        /// The route path.
        path: String,
        /// The method name.
        method: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_unsupported_method_error() {
        let err = DocsError::UnsupportedMethod {
            path: "/users".to_string(),
            method: "PATCH".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported method PATCH on /users");
    }
}
