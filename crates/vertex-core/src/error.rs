//! Error types for Vertex.
//!
//! [`ApiError`] is the closed error taxonomy shared by handlers, middleware
//! and the dispatch lifecycle. Every variant carries the message it was
//! created with; the dispatcher is the single place that maps a variant to a
//! client-visible status and message.
//!
//! | Variant | Status | Client message |
//! |---|---|---|
//! | `InvalidInput` | 400 | the message itself |
//! | `InvalidRequest` | 400 | opaque incident reference |
//! | `Unauthorized` | 401 | opaque incident reference |
//! | `InsecureAccessDenied` | 403 | opaque incident reference |
//! | `ResourceUnavailable` / `BackOff` | 503 | opaque incident reference |
//! | `GeneralFailure` | 500 | opaque incident reference |
//! | `Hijacked` | 200 | never rendered |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Discriminant of an [`ApiError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unclassified server-side failure.
    GeneralFailure,
    /// The request data could not be read at all.
    InvalidRequest,
    /// Schema or validation violation.
    InvalidInput,
    /// Rejected by a security scheme or auth middleware.
    Unauthorized,
    /// Plaintext access to a secure-only resource.
    InsecureAccessDenied,
    /// We do not want to serve this request; the client should not retry.
    ResourceUnavailable,
    /// The client should back off before retrying.
    BackOff,
    /// A middleware wrote the response itself.
    Hijacked,
}

impl ErrorKind {
    /// Returns the numeric code logged with every failed request.
    ///
    /// `0` is reserved for success.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::GeneralFailure => 1,
            Self::InvalidRequest => 2,
            Self::InvalidInput => 4,
            Self::Unauthorized => 5,
            Self::InsecureAccessDenied => 6,
            Self::ResourceUnavailable => 7,
            Self::BackOff => 8,
            Self::Hijacked => 9,
        }
    }

    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InsecureAccessDenied => StatusCode::FORBIDDEN,
            Self::ResourceUnavailable | Self::BackOff => StatusCode::SERVICE_UNAVAILABLE,
            Self::GeneralFailure => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Hijacked => StatusCode::OK,
        }
    }
}

/// Standard error type for Vertex handlers and middleware.
///
/// # Example
///
/// ```
/// use vertex_core::{ApiError, ErrorKind};
///
/// fn check_age(age: i64) -> Result<(), ApiError> {
///     if age < 0 {
///         return Err(ApiError::invalid_input("Value too small for age"));
///     }
///     Ok(())
/// }
///
/// let err = check_age(-1).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidInput);
/// assert_eq!(err.http_status(), 400);
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// General failure.
    #[error("{message}")]
    GeneralFailure {
        /// Human-readable error message (logged, never sent to clients).
        message: String,
    },

    /// Input validation failed. The message is safe to show to clients.
    #[error("{message}")]
    InvalidInput {
        /// Human-readable error message.
        message: String,
        /// The wire name of the offending parameter, if known.
        field: Option<String>,
    },

    /// Something went wrong reading the request data itself.
    #[error("{message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The request was denied for auth reasons; the client may log in and retry.
    #[error("{message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Insecure access denied.
    #[error("{message}")]
    InsecureAccessDenied {
        /// Human-readable error message.
        message: String,
    },

    /// We do not want to serve this request; the client should not retry.
    #[error("{message}")]
    ResourceUnavailable {
        /// Human-readable error message.
        message: String,
    },

    /// The client should back off for the given duration.
    #[error("Retry-Seconds: {:.2}", .retry_after.as_secs_f64())]
    BackOff {
        /// How long the client should wait.
        retry_after: Duration,
    },

    /// A middleware took over the request and the renderer must not render.
    #[error("Request Hijacked, Do not render response")]
    Hijacked,
}

impl ApiError {
    /// Creates a general failure.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self::GeneralFailure {
            message: message.into(),
        }
    }

    /// Creates an invalid input error without a field reference.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Creates an invalid input error citing a parameter.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an insecure access error.
    #[must_use]
    pub fn insecure_access_denied(message: impl Into<String>) -> Self {
        Self::InsecureAccessDenied {
            message: message.into(),
        }
    }

    /// Creates a resource unavailable error.
    #[must_use]
    pub fn resource_unavailable(message: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a back-off error.
    #[must_use]
    pub const fn back_off(retry_after: Duration) -> Self {
        Self::BackOff { retry_after }
    }

    /// Wraps any foreign error as a general failure.
    ///
    /// Errors that already are [`ApiError`]s should be propagated as-is
    /// instead of going through this function.
    pub fn from_error(err: impl std::error::Error) -> Self {
        Self::general(err.to_string())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::GeneralFailure { .. } => ErrorKind::GeneralFailure,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InsecureAccessDenied { .. } => ErrorKind::InsecureAccessDenied,
            Self::ResourceUnavailable { .. } => ErrorKind::ResourceUnavailable,
            Self::BackOff { .. } => ErrorKind::BackOff,
            Self::Hijacked => ErrorKind::Hijacked,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.kind().http_status()
    }

    /// Returns `true` for the hijacked sentinel.
    #[must_use]
    pub const fn is_hijacked(&self) -> bool {
        matches!(self, Self::Hijacked)
    }

    /// Returns the parameter cited by an invalid input error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Returns the message that may be shown to the client.
    ///
    /// Validation messages are surfaced verbatim. Everything else is replaced
    /// with `[<incident>] <reason phrase>` so internal details never leak.
    #[must_use]
    pub fn client_message(&self, incident: &Uuid) -> String {
        match self {
            Self::InvalidInput { message, .. } => message.clone(),
            Self::Hijacked => "Request Hijacked By Handler".to_string(),
            _ => {
                let status = self.http_status();
                format!(
                    "[{incident}] {}",
                    status.canonical_reason().unwrap_or("Unknown Error")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_surfaces_message() {
        let error = ApiError::invalid_field("age", "Value too small for age");
        let incident = Uuid::now_v7();

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(error.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.client_message(&incident), "Value too small for age");
        assert_eq!(error.field(), Some("age"));
    }

    #[test]
    fn test_opaque_messages_hide_details() {
        let incident = Uuid::now_v7();
        let error = ApiError::general("database password is hunter2");

        let message = error.client_message(&incident);
        assert!(!message.contains("hunter2"));
        assert_eq!(message, format!("[{incident}] Internal Server Error"));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::general("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (ApiError::invalid_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::insecure_access_denied("x"), StatusCode::FORBIDDEN),
            (ApiError::resource_unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (
                ApiError::back_off(Duration::from_secs(3)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::Hijacked, StatusCode::OK),
        ];

        for (error, status) in cases {
            assert_eq!(error.http_status(), status, "{error:?}");
        }
    }

    #[test]
    fn test_invalid_request_is_opaque() {
        let incident = Uuid::now_v7();
        let error = ApiError::invalid_request("Error decoding input");
        assert_eq!(
            error.client_message(&incident),
            format!("[{incident}] Bad Request")
        );
    }

    #[test]
    fn test_back_off_message() {
        let error = ApiError::back_off(Duration::from_millis(1500));
        assert_eq!(error.to_string(), "Retry-Seconds: 1.50");
    }

    #[test]
    fn test_hijacked() {
        assert!(ApiError::Hijacked.is_hijacked());
        assert!(!ApiError::general("x").is_hijacked());
    }

    #[test]
    fn test_from_error_wraps_as_general_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = ApiError::from_error(io);
        assert_eq!(error.kind(), ErrorKind::GeneralFailure);
        assert_eq!(error.to_string(), "disk on fire");
    }

    #[test]
    fn test_error_codes_are_unique() {
        let kinds = [
            ErrorKind::GeneralFailure,
            ErrorKind::InvalidRequest,
            ErrorKind::InvalidInput,
            ErrorKind::Unauthorized,
            ErrorKind::InsecureAccessDenied,
            ErrorKind::ResourceUnavailable,
            ErrorKind::BackOff,
            ErrorKind::Hijacked,
        ];
        let mut codes: Vec<u16> = kinds.iter().map(ErrorKind::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }
}
