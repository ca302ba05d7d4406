//! The per-request dispatch lifecycle.
//!
//! ```text
//! Received ──► SecurityChecked ──► ChainExecuted ──► Rendered
//!    │               │                    │
//!    └─ 403 insecure └─ 401 unauthorized  └─ hijacked: nothing rendered
//! ```
//!
//! Every request makes exactly one linear pass. The security check runs
//! outside the middleware chain, and the renderer runs once at the end
//! unless a middleware hijacked the response.

use crate::render::SharedRenderer;
use crate::security::SharedSecurity;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use std::fmt;
use std::net::SocketAddr;
use vertex_core::{ApiError, ApiResult, HandlerResult, RequestContext, ResponseWriter};
use vertex_middleware::Chain;
use vertex_router::PathParams;

/// Message sent to clients refused for using plain HTTP.
pub const INSECURE_ACCESS_MESSAGE: &str = "Insecure Access Forbidden";

/// Body type of every response.
pub type ResponseBody = Full<Bytes>;

/// A complete HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Lifecycle states of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// The request context was built.
    Received,
    /// The security scheme accepted the request, or none is configured.
    SecurityChecked,
    /// The middleware chain returned.
    ChainExecuted,
    /// The renderer wrote the result.
    Rendered,
}

/// Dispatches requests for one route.
///
/// Built once when the registry is frozen and shared by every request.
pub struct Dispatcher {
    path: String,
    chain: Chain,
    security: Option<SharedSecurity>,
    renderer: SharedRenderer,
    allow_insecure: bool,
}

impl Dispatcher {
    /// Creates a dispatcher for a route.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        chain: Chain,
        security: Option<SharedSecurity>,
        renderer: SharedRenderer,
        allow_insecure: bool,
    ) -> Self {
        Self {
            path: path.into(),
            chain,
            security,
            renderer,
            allow_insecure,
        }
    }

    /// The full route path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The route's middleware chain.
    #[must_use]
    pub const fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Handles a request whose body was already collected.
    ///
    /// Path parameters are written into the form, replacing query and body
    /// values of the same name.
    pub async fn dispatch(
        &self,
        request: Request<Bytes>,
        peer: Option<SocketAddr>,
        params: &PathParams,
    ) -> HttpResponse {
        let mut req = RequestContext::from_request(request, peer);
        for (name, value) in params.iter() {
            req.form_mut().set(name, value);
        }

        into_http_response(self.run(&mut req).await)
    }

    /// Runs the lifecycle on a prepared request context.
    pub async fn run(&self, req: &mut RequestContext) -> ResponseWriter {
        let mut w = ResponseWriter::new();
        self.trace(DispatchState::Received, req);

        if !self.allow_insecure && !req.is_secure() && !req.is_local() {
            tracing::warn!(
                request_id = %req.request_id(),
                path = %self.path,
                remote_ip = ?req.remote_ip(),
                "refusing insecure request"
            );
            w.write_error(StatusCode::FORBIDDEN, INSECURE_ACCESS_MESSAGE);
            return w;
        }

        let result = match self.check_security(req) {
            Ok(()) => {
                self.trace(DispatchState::SecurityChecked, req);
                self.chain.handle(&mut w, req).await
            }
            Err(err) => Err(err),
        };
        self.trace(DispatchState::ChainExecuted, req);

        self.finish(result, &mut w, req);
        w
    }

    fn check_security(&self, req: &RequestContext) -> ApiResult<()> {
        let Some(scheme) = &self.security else {
            return Ok(());
        };

        scheme.validate(req).map_err(|err| {
            tracing::warn!(
                request_id = %req.request_id(),
                path = %self.path,
                error = %err,
                "security scheme rejected request"
            );
            match err {
                ApiError::Hijacked => err,
                other => ApiError::unauthorized(other.to_string()),
            }
        })
    }

    fn finish(&self, result: HandlerResult, w: &mut ResponseWriter, req: &RequestContext) {
        if matches!(result, Err(ApiError::Hijacked)) {
            tracing::debug!(
                request_id = %req.request_id(),
                path = %self.path,
                "not rendering hijacked request"
            );
            return;
        }

        if let Err(err) = self.renderer.render(result, w, req) {
            tracing::error!(
                request_id = %req.request_id(),
                path = %self.path,
                error = %err,
                "error rendering response"
            );
            w.write_error(StatusCode::INTERNAL_SERVER_ERROR, "Error sending response");
        }
        self.trace(DispatchState::Rendered, req);
    }

    fn trace(&self, state: DispatchState, req: &RequestContext) {
        tracing::trace!(
            request_id = %req.request_id(),
            path = %self.path,
            state = ?state,
            "dispatch"
        );
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("path", &self.path)
            .field("chain", &self.chain)
            .field("security", &self.security.is_some())
            .field("allow_insecure", &self.allow_insecure)
            .finish_non_exhaustive()
    }
}

/// Converts a filled response writer into an HTTP response.
#[must_use]
pub fn into_http_response(w: ResponseWriter) -> HttpResponse {
    let (status, headers, body) = w.into_parts();
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Builds a plain-text error response.
#[must_use]
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    let mut w = ResponseWriter::new();
    w.write_error(status, message);
    into_http_response(w)
}
