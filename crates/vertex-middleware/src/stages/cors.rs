//! CORS response headers.
//!
//! ## Example
//!
//! ```
//! use vertex_middleware::stages::Cors;
//!
//! let cors = Cors::new()
//!     .allow_origin("https://app.example.com")
//!     .allow_methods(["GET", "POST"])
//!     .allow_credentials(true);
//! ```

use crate::middleware::{Middleware, Next};
use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// CORS header names.
pub mod headers {
    /// `Access-Control-Allow-Origin` header.
    pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
    /// `Access-Control-Allow-Methods` header.
    pub const ALLOW_METHODS: &str = "access-control-allow-methods";
    /// `Access-Control-Allow-Headers` header.
    pub const ALLOW_HEADERS: &str = "access-control-allow-headers";
    /// `Access-Control-Allow-Credentials` header.
    pub const ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    /// `Access-Control-Expose-Headers` header.
    pub const EXPOSE_HEADERS: &str = "access-control-expose-headers";
}

/// Writes CORS headers on every response, then continues the chain.
#[derive(Debug, Clone)]
pub struct Cors {
    allow_origin: String,
    expose_headers: Vec<String>,
    allow_headers: Vec<String>,
    allow_methods: Vec<String>,
    allow_credentials: bool,
}

impl Default for Cors {
    fn default() -> Self {
        Self::new()
    }
}

impl Cors {
    /// Creates a policy allowing any origin and nothing else.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_origin: "*".to_string(),
            expose_headers: Vec::new(),
            allow_headers: Vec::new(),
            allow_methods: Vec::new(),
            allow_credentials: false,
        }
    }

    /// A generic browser-friendly policy.
    ///
    /// Exposes and allows `WWW-Authenticate` and `Authorization`, allows
    /// credentials and allows `GET`, `POST`, `OPTIONS` and `PUT`.
    #[must_use]
    pub fn default_policy(self) -> Self {
        let auth_headers = ["WWW-Authenticate", "Authorization"];
        self.expose_headers(auth_headers)
            .allow_headers(auth_headers)
            .allow_credentials(true)
            .allow_methods(["GET", "POST", "OPTIONS", "PUT"])
    }

    /// Sets the allowed origin. An empty origin omits the header.
    #[must_use]
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    /// Sets the headers exposed to scripts.
    #[must_use]
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the allowed request headers.
    #[must_use]
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the allowed methods.
    #[must_use]
    pub fn allow_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether credentials are allowed.
    #[must_use]
    pub const fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    fn apply(&self, w: &mut ResponseWriter) {
        if !self.allow_origin.is_empty() {
            w.set_header(headers::ALLOW_ORIGIN, &self.allow_origin);
        }
        if !self.allow_headers.is_empty() {
            w.set_header(headers::ALLOW_HEADERS, &self.allow_headers.join(","));
        }
        if !self.expose_headers.is_empty() {
            w.set_header(headers::EXPOSE_HEADERS, &self.expose_headers.join(","));
        }
        if !self.allow_methods.is_empty() {
            w.set_header(headers::ALLOW_METHODS, &self.allow_methods.join(","));
        }
        if self.allow_credentials {
            w.set_header(headers::ALLOW_CREDENTIALS, "true");
        }
    }
}

impl Middleware for Cors {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        self.apply(w);
        next.run(w, req)
    }
}
