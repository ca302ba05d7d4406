//! Pluggable request authentication.
//!
//! A security scheme runs once per request, before the middleware chain.
//! An API carries a default scheme and a route may override it.

use std::fmt;
use std::sync::Arc;
use vertex_core::{ApiError, RequestContext};

/// Validates a request before it reaches the middleware chain.
pub trait SecurityScheme: Send + Sync + 'static {
    /// Accepts or rejects the request.
    ///
    /// Any error is reported to the client as unauthorized.
    fn validate(&self, req: &RequestContext) -> Result<(), ApiError>;
}

/// A shared security scheme.
pub type SharedSecurity = Arc<dyn SecurityScheme>;

/// A security scheme backed by a closure.
pub struct SecurityFn<F> {
    func: F,
}

impl<F> SecurityScheme for SecurityFn<F>
where
    F: Fn(&RequestContext) -> Result<(), ApiError> + Send + Sync + 'static,
{
    fn validate(&self, req: &RequestContext) -> Result<(), ApiError> {
        (self.func)(req)
    }
}

impl<F> fmt::Debug for SecurityFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityFn").finish_non_exhaustive()
    }
}

/// Creates a security scheme from a closure.
///
/// # Example
///
/// ```
/// use vertex_core::ApiError;
/// use vertex_server::security_fn;
///
/// let scheme = security_fn(|req| match req.header("x-token") {
///     Some("secret") => Ok(()),
///     _ => Err(ApiError::unauthorized("bad token")),
/// });
/// # let _ = scheme;
/// ```
pub fn security_fn<F>(func: F) -> SharedSecurity
where
    F: Fn(&RequestContext) -> Result<(), ApiError> + Send + Sync + 'static,
{
    Arc::new(SecurityFn { func })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn ctx(token: Option<&str>) -> RequestContext {
        let mut builder = http::Request::builder().uri("/svc/v1/x");
        if let Some(token) = token {
            builder = builder.header("x-token", token);
        }
        RequestContext::from_request(builder.body(Bytes::new()).unwrap(), None)
    }

    #[test]
    fn test_security_fn() {
        let scheme = security_fn(|req| match req.header("x-token") {
            Some("secret") => Ok(()),
            _ => Err(ApiError::unauthorized("bad token")),
        });

        assert!(scheme.validate(&ctx(Some("secret"))).is_ok());
        let err = scheme.validate(&ctx(None)).unwrap_err();
        assert_eq!(err.to_string(), "bad token");
    }
}
