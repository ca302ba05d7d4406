//! Concurrent request limiting.

use crate::middleware::{Middleware, Next};
use std::sync::atomic::{AtomicUsize, Ordering};
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};
use vertex_telemetry::metrics;

/// Limits the number of concurrently running requests.
///
/// Applied to an API it limits the API as a whole. Applied to a route it
/// limits that route only. Both can be combined.
#[derive(Debug)]
pub struct ConnectionLimiter {
    max: usize,
    running: AtomicUsize,
}

struct RunningGuard<'a>(&'a AtomicUsize);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        let now = self.0.fetch_sub(1, Ordering::AcqRel) - 1;
        metrics::set_concurrent_requests(now);
    }
}

impl ConnectionLimiter {
    /// Creates a limiter allowing `max` concurrent requests.
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self {
            max,
            running: AtomicUsize::new(0),
        }
    }

    /// Requests currently running through this limiter.
    #[must_use]
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    fn enter(&self) -> (RunningGuard<'_>, usize) {
        let num = self.running.fetch_add(1, Ordering::AcqRel) + 1;
        metrics::set_concurrent_requests(num);
        (RunningGuard(&self.running), num)
    }
}

impl Middleware for ConnectionLimiter {
    fn name(&self) -> &'static str {
        "connection_limiter"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let (_guard, num) = self.enter();
            if num > self.max {
                metrics::record_over_capacity();
                tracing::warn!(running = num, max = self.max, "connection limit exceeded");
                return Err(ApiError::resource_unavailable("Connection Limit Exceeded"));
            }
            next.run(w, req).await
        })
    }
}
