//! Response sink and handler reply types.

use crate::error::ApiError;
use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

/// The value a handler returns on success.
///
/// Renderers decide how each variant reaches the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A structured value, serialized by the renderer.
    Json(serde_json::Value),
    /// Plain text.
    Text(String),
    /// Raw bytes with an explicit content type.
    Bytes {
        /// The `Content-Type` to send.
        content_type: String,
        /// The payload.
        body: Bytes,
    },
    /// No payload.
    Empty,
}

impl Reply {
    /// Serializes any value into a [`Reply::Json`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(ApiError::from_error)
    }

    /// Creates a text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the reply as a JSON value, if it is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for [`Reply::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

/// The response sink handed to middleware, handlers and renderers.
///
/// Headers set by middleware before the renderer runs are kept. A middleware
/// that hijacks the request writes its status and body here directly.
///
/// # Example
///
/// ```
/// use vertex_core::ResponseWriter;
/// use http::StatusCode;
///
/// let mut w = ResponseWriter::new();
/// w.set_header("www-authenticate", "Basic realm=\"api\"");
/// w.write_status(StatusCode::UNAUTHORIZED);
/// w.write(b"401 Unauthorized\n");
///
/// let (status, headers, body) = w.into_parts();
/// assert_eq!(status, StatusCode::UNAUTHORIZED);
/// assert!(headers.contains_key("www-authenticate"));
/// assert_eq!(&body[..], b"401 Unauthorized\n");
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the headers written so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers for mutation.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing existing values.
    ///
    /// Invalid names or values are dropped with a warning.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets the status code. The first call wins.
    pub fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Returns the status written so far, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Appends bytes to the body. Implies `200 OK` if no status was written.
    pub fn write(&mut self, data: &[u8]) {
        self.write_status(StatusCode::OK);
        self.body.extend_from_slice(data);
    }

    /// Returns `true` if a status or body has been written.
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.status.is_some() || !self.body.is_empty()
    }

    /// Writes a plain-text error response.
    pub fn write_error(&mut self, status: StatusCode, message: &str) {
        self.set_header("content-type", "text/plain; charset=utf-8");
        self.set_header("x-content-type-options", "nosniff");
        self.write_status(status);
        self.body.extend_from_slice(message.as_bytes());
        self.body.extend_from_slice(b"\n");
    }

    /// Consumes the writer, returning status, headers and body.
    ///
    /// The status defaults to `200 OK`.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (
            self.status.unwrap_or(StatusCode::OK),
            self.headers,
            self.body.freeze(),
        )
    }
}
