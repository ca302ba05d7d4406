//! Response renderers.
//!
//! A renderer receives the final [`HandlerResult`] of a request, after the
//! whole middleware chain ran, and writes it to the [`ResponseWriter`]. It
//! is called exactly once per request unless a middleware hijacked it.

use crate::error::RenderError;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use vertex_core::{ApiError, HandlerResult, Reply, RequestContext, ResponseWriter};

/// Header carrying the request processing time in milliseconds.
pub const HEADER_PROCESSING_TIME: &str = "x-vertex-processingtime";

/// Header carrying the request id.
pub const HEADER_REQUEST_ID: &str = "x-vertex-requestid";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const JSONP_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Writes a handler result to the client.
pub trait Renderer: Send + Sync + 'static {
    /// Renders a result.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the result could not be written.
    fn render(
        &self,
        result: HandlerResult,
        w: &mut ResponseWriter,
        req: &RequestContext,
    ) -> Result<(), RenderError>;

    /// Content types this renderer produces, as advertised in the docs.
    fn content_types(&self) -> Vec<String>;
}

/// A shared renderer.
pub type SharedRenderer = Arc<dyn Renderer>;

/// Writes the processing time and request id headers.
pub fn write_meta_headers(w: &mut ResponseWriter, req: &RequestContext) {
    let millis = req.elapsed().as_secs_f64() * 1000.0;
    w.set_header(HEADER_PROCESSING_TIME, &format!("{millis:.03}"));
    w.set_header(HEADER_REQUEST_ID, &req.request_id().to_string());
}

/// Writes an error as plain text with its HTTP status.
///
/// Messages that are not safe for clients are replaced by an incident
/// reference, and the full error is logged under that reference.
pub fn write_api_error(w: &mut ResponseWriter, req: &RequestContext, err: &ApiError) {
    let incident = Uuid::now_v7();
    let status = err.http_status();

    if status.is_server_error() {
        tracing::error!(
            request_id = %req.request_id(),
            incident = %incident,
            path = req.path(),
            code = err.kind().code(),
            error = %err,
            "request failed"
        );
    } else {
        tracing::warn!(
            request_id = %req.request_id(),
            incident = %incident,
            path = req.path(),
            kind = ?err.kind(),
            code = err.kind().code(),
            error = %err,
            "request rejected"
        );
    }

    if let ApiError::BackOff { retry_after } = err {
        w.set_header("retry-after", &retry_after.as_secs().max(1).to_string());
    }
    w.write_error(status, &err.client_message(&incident));
}

/// Renders replies as JSON, or JSONP when a callback is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(
        &self,
        result: HandlerResult,
        w: &mut ResponseWriter,
        req: &RequestContext,
    ) -> Result<(), RenderError> {
        write_meta_headers(w, req);

        let reply = match result {
            Ok(reply) => reply,
            Err(ApiError::Hijacked) => return Ok(()),
            Err(err) => {
                write_api_error(w, req, &err);
                return Ok(());
            }
        };

        match reply {
            Reply::Json(value) => {
                let body = serde_json::to_vec(&value)?;
                match req.callback() {
                    Some(callback) => {
                        w.set_header("content-type", JSONP_CONTENT_TYPE);
                        w.write(callback.as_bytes());
                        w.write(b"(");
                        w.write(&body);
                        w.write(b");\n");
                    }
                    None => {
                        w.set_header("content-type", JSON_CONTENT_TYPE);
                        w.write(&body);
                    }
                }
            }
            Reply::Text(text) => {
                w.set_header("content-type", TEXT_CONTENT_TYPE);
                w.write(text.as_bytes());
            }
            Reply::Bytes { content_type, body } => {
                w.set_header("content-type", &content_type);
                w.write(&body);
            }
            Reply::Empty => w.write_status(StatusCode::OK),
        }
        Ok(())
    }

    fn content_types(&self) -> Vec<String> {
        vec!["text/json".to_string()]
    }
}

type RenderFunc =
    dyn Fn(HandlerResult, &mut ResponseWriter, &RequestContext) -> Result<(), RenderError> + Send + Sync;

/// A renderer backed by a closure.
pub struct RenderFn {
    func: Box<RenderFunc>,
    content_types: Vec<String>,
}

impl RenderFn {
    /// Wraps a rendering closure and the content types it produces.
    pub fn new<F, I, S>(content_types: I, func: F) -> Self
    where
        F: Fn(HandlerResult, &mut ResponseWriter, &RequestContext) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            func: Box::new(func),
            content_types: content_types.into_iter().map(Into::into).collect(),
        }
    }
}

impl Renderer for RenderFn {
    fn render(
        &self,
        result: HandlerResult,
        w: &mut ResponseWriter,
        req: &RequestContext,
    ) -> Result<(), RenderError> {
        (self.func)(result, w, req)
    }

    fn content_types(&self) -> Vec<String> {
        self.content_types.clone()
    }
}

impl fmt::Debug for RenderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFn")
            .field("content_types", &self.content_types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::time::Duration;

    fn ctx(uri: &str) -> RequestContext {
        let request = http::Request::builder().uri(uri).body(Bytes::new()).unwrap();
        RequestContext::from_request(request, None)
    }

    fn render(result: HandlerResult, req: &RequestContext) -> (StatusCode, http::HeaderMap, Bytes) {
        let mut w = ResponseWriter::new();
        JsonRenderer.render(result, &mut w, req).unwrap();
        w.into_parts()
    }

    #[test]
    fn test_json_reply() {
        let req = ctx("/svc/v1/x");
        let (status, headers, body) = render(Ok(Reply::Json(serde_json::json!({"a": 1}))), &req);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], JSON_CONTENT_TYPE);
        assert_eq!(&body[..], br#"{"a":1}"#);
        assert!(headers.contains_key(HEADER_PROCESSING_TIME));
        assert_eq!(
            headers[HEADER_REQUEST_ID].to_str().unwrap(),
            req.request_id().to_string()
        );
    }

    #[test]
    fn test_processing_time_has_three_decimals() {
        let req = ctx("/svc/v1/x");
        let (_, headers, _) = render(Ok(Reply::Empty), &req);
        let value = headers[HEADER_PROCESSING_TIME].to_str().unwrap();
        let decimals = value.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 3);
    }

    #[test]
    fn test_jsonp_reply() {
        let req = ctx("/svc/v1/x?callback=cb");
        let (_, headers, body) = render(Ok(Reply::Json(serde_json::json!([1, 2]))), &req);

        assert_eq!(headers["content-type"], JSONP_CONTENT_TYPE);
        assert_eq!(&body[..], b"cb([1,2]);\n");
    }

    #[test]
    fn test_script_callback_renders_plain_json() {
        let req = ctx("/svc/v1/x?callback=alert(document.cookie);//");
        let (_, headers, body) = render(Ok(Reply::Json(serde_json::json!({"a": 1}))), &req);

        assert_eq!(headers["content-type"], JSON_CONTENT_TYPE);
        assert_eq!(&body[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_invalid_input_is_surfaced() {
        let req = ctx("/svc/v1/x");
        let (status, _, body) = render(Err(ApiError::invalid_field("age", "Value too small for age")), &req);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"Value too small for age\n");
    }

    #[test]
    fn test_general_failure_is_opaque() {
        let req = ctx("/svc/v1/x");
        let (status, _, body) = render(Err(ApiError::general("database password wrong")), &req);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.ends_with("] Internal Server Error\n"));
        assert!(!text.contains("password"));
    }

    #[test]
    fn test_back_off_sets_retry_after() {
        let req = ctx("/svc/v1/x");
        let (status, headers, _) = render(Err(ApiError::back_off(Duration::from_secs(5))), &req);

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(headers["retry-after"], "5");
    }

    #[test]
    fn test_text_and_bytes() {
        let req = ctx("/svc/v1/x");
        let (_, headers, body) = render(Ok(Reply::text("hello")), &req);
        assert_eq!(headers["content-type"], TEXT_CONTENT_TYPE);
        assert_eq!(&body[..], b"hello");

        let reply = Reply::Bytes {
            content_type: "image/png".to_string(),
            body: Bytes::from_static(b"\x89PNG"),
        };
        let (_, headers, body) = render(Ok(reply), &req);
        assert_eq!(headers["content-type"], "image/png");
        assert_eq!(&body[..], b"\x89PNG");
    }

    #[test]
    fn test_render_fn() {
        let renderer = RenderFn::new(["text/plain"], |result, w, _req| {
            let text = match result {
                Ok(_) => "ok",
                Err(_) => "err",
            };
            w.write(text.as_bytes());
            Ok(())
        });

        let req = ctx("/svc/v1/x");
        let mut w = ResponseWriter::new();
        renderer.render(Ok(Reply::Empty), &mut w, &req).unwrap();
        assert_eq!(renderer.content_types(), vec!["text/plain"]);
        assert_eq!(&w.into_parts().2[..], b"ok");
    }
}
