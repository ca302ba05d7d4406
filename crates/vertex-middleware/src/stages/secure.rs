//! Per-route TLS enforcement.

use crate::middleware::{Middleware, Next};
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// Rejects insecure requests regardless of the API's own setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceSecure {
    allow_local_insecure: bool,
}

impl ForceSecure {
    /// Creates the check. Local insecure requests are rejected too.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_local_insecure: false,
        }
    }

    /// Lets insecure requests from loopback addresses through.
    #[must_use]
    pub const fn allow_local_insecure(mut self, allow: bool) -> Self {
        self.allow_local_insecure = allow;
        self
    }

    fn check(self, req: &RequestContext) -> Result<(), ApiError> {
        if req.is_secure() || (self.allow_local_insecure && req.is_local()) {
            Ok(())
        } else {
            Err(ApiError::unauthorized("Insecure Access Forbidden"))
        }
    }
}

impl Middleware for ForceSecure {
    fn name(&self) -> &'static str {
        "force_secure"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if let Err(e) = self.check(req) {
            return Box::pin(async move { Err(e) });
        }
        next.run(w, req)
    }
}
