//! Request logging.

use crate::middleware::{Middleware, Next};
use tracing::{info, warn};
use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// Logs each request on entry and its outcome on exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            info!(
                request_id = %req.request_id(),
                method = %req.method(),
                uri = %req.uri(),
                "Handling {} {}",
                req.method(),
                req.uri()
            );

            let result = next.run(&mut *w, &mut *req).await;

            let elapsed_ms = req.elapsed().as_secs_f64() * 1000.0;
            match &result {
                Ok(reply) => info!(
                    request_id = %req.request_id(),
                    elapsed_ms,
                    reply = ?reply,
                    "request succeeded"
                ),
                Err(e) if e.is_hijacked() => info!(
                    request_id = %req.request_id(),
                    elapsed_ms,
                    "request hijacked"
                ),
                Err(e) => warn!(
                    request_id = %req.request_id(),
                    elapsed_ms,
                    error = %e,
                    kind = ?e.kind(),
                    "request failed"
                ),
            }
            result
        })
    }
}
