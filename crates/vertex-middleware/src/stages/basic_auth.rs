//! HTTP basic authentication.

use crate::middleware::{Middleware, Next};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::StatusCode;
use tracing::{debug, warn};
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// Requires a fixed user and password through HTTP basic auth.
///
/// On failure the middleware writes a `401` challenge itself and hijacks the
/// request.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    user: String,
    password: String,
    realm: String,
    bypass_for_local: bool,
}

impl BasicAuth {
    /// Creates a basic auth check for one user.
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            realm: realm.into(),
            bypass_for_local: false,
        }
    }

    /// Skips the check for requests from loopback addresses.
    #[must_use]
    pub const fn bypass_for_local(mut self, bypass: bool) -> Self {
        self.bypass_for_local = bypass;
        self
    }

    fn require_auth(&self, w: &mut ResponseWriter) -> ApiError {
        w.set_header("www-authenticate", &format!("Basic realm=\"{}\"", self.realm));
        w.write_status(StatusCode::UNAUTHORIZED);
        w.write(b"401 Unauthorized\n");
        ApiError::Hijacked
    }

    fn authorized(&self, req: &RequestContext) -> bool {
        if self.bypass_for_local && req.is_local() {
            return true;
        }
        match credentials(req) {
            Some((user, pass)) if user == self.user && pass == self.password => true,
            Some((user, _)) => {
                warn!(user = %user, "unmatching basic auth credentials");
                false
            }
            None => {
                debug!("no basic auth header, denying");
                false
            }
        }
    }
}

/// Decodes the `Authorization: Basic` credentials of a request.
fn credentials(req: &RequestContext) -> Option<(String, String)> {
    let header = req.header("authorization")?;
    let (scheme, encoded) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

impl Middleware for BasicAuth {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if !self.authorized(req) {
            let err = self.require_auth(w);
            return Box::pin(async move { Err(err) });
        }
        next.run(w, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::middleware::middleware_fn;
    use bytes::Bytes;
    use vertex_core::Reply;

    fn chain(auth: BasicAuth) -> Chain {
        Chain::builder()
            .with(auth)
            .terminal(middleware_fn("ok", |_w, _req, _next| {
                Box::pin(async { Ok(Reply::text("in")) })
            }))
            .build()
    }

    async fn call(chain: &Chain, auth: Option<&str>, peer: &str) -> (HandlerResult, ResponseWriter) {
        let mut builder = http::Request::builder().uri("/admin");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        let request = builder.body(Bytes::new()).unwrap();
        let mut req = RequestContext::from_request(request, Some(peer.parse().unwrap()));
        let mut w = ResponseWriter::new();
        let result = chain.handle(&mut w, &mut req).await;
        (result, w)
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let chain = chain(BasicAuth::new("admin", "s3cret", "ops"));
        let (result, _) = call(&chain, Some(&basic("admin", "s3cret")), "10.0.0.1:1000").await;
        assert_eq!(result.unwrap(), Reply::text("in"));
    }

    #[tokio::test]
    async fn test_missing_credentials_hijacks() {
        let chain = chain(BasicAuth::new("admin", "s3cret", "ops"));
        let (result, w) = call(&chain, None, "10.0.0.1:1000").await;

        assert!(result.unwrap_err().is_hijacked());
        assert_eq!(w.header("www-authenticate"), Some("Basic realm=\"ops\""));
        let (status, _, body) = w.into_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(&body[..], b"401 Unauthorized\n");
    }

    #[tokio::test]
    async fn test_wrong_password_hijacks() {
        let chain = chain(BasicAuth::new("admin", "s3cret", "ops"));
        let (result, _) = call(&chain, Some(&basic("admin", "nope")), "10.0.0.1:1000").await;
        assert!(result.unwrap_err().is_hijacked());
    }

    #[tokio::test]
    async fn test_local_bypass() {
        let chain = chain(BasicAuth::new("admin", "s3cret", "ops").bypass_for_local(true));
        let (result, _) = call(&chain, None, "127.0.0.1:1000").await;
        assert!(result.is_ok());

        let (result, _) = call(&chain, None, "10.0.0.1:1000").await;
        assert!(result.is_err());
    }
}
