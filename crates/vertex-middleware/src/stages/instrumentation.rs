//! Request timing and success metrics.

use crate::middleware::{Middleware, Next};
use std::time::Instant;
use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};
use vertex_telemetry::metrics;

/// Records request duration and success or failure per path.
///
/// The metric key is the URL path with slashes replaced by dots, so
/// `/users/v1/list` is recorded as `users.v1.list`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instrumentation;

/// Converts a URL path into a dotted metric key.
#[must_use]
pub fn metric_key(path: &str) -> String {
    path.trim_matches('/').split('/').collect::<Vec<_>>().join(".")
}

impl Middleware for Instrumentation {
    fn name(&self) -> &'static str {
        "instrumentation"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let key = metric_key(req.path());
            let start = Instant::now();
            let result = next.run(w, req).await;
            metrics::record_request(&key, result.is_ok(), start.elapsed());
            result
        })
    }
}
