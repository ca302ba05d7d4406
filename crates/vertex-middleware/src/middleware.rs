//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every chain element
//! implements. Middleware runs before the handler and may inspect or change
//! the request, write headers, short-circuit with its own result, or pass
//! control on with [`Next::run`] and post-process what comes back.
//!
//! # Example
//!
//! ```
//! use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};
//! use vertex_middleware::{Middleware, Next};
//!
//! struct Stamp;
//!
//! impl Middleware for Stamp {
//!     fn name(&self) -> &'static str {
//!         "stamp"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         w: &'a mut ResponseWriter,
//!         req: &'a mut RequestContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move {
//!             w.set_header("x-stamp", "1");
//!             next.run(w, req).await
//!         })
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// A chain element.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once. `Next` is consumed by `run`.
/// - Returning without calling `next` short-circuits the rest of the chain.
/// - Returning [`ApiError::Hijacked`] means the middleware wrote the full
///   response itself and nothing is rendered.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// The rest of the chain after the current middleware.
///
/// Single use: [`Next::run`] consumes it.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub(crate) const fn new(remaining: &'a [Arc<dyn Middleware>]) -> Self {
        Self { remaining }
    }

    /// Invokes the next middleware in the chain.
    ///
    /// Running past the end of the chain is a programming error and yields a
    /// general failure.
    pub fn run<'b>(
        self,
        w: &'b mut ResponseWriter,
        req: &'b mut RequestContext,
    ) -> BoxFuture<'b, HandlerResult>
    where
        'a: 'b,
    {
        match self.remaining.split_first() {
            Some((middleware, rest)) => middleware.handle(w, req, Next::new(rest)),
            None => Box::pin(async {
                tracing::error!("middleware chain exhausted without a terminal");
                Err(ApiError::general("middleware chain exhausted"))
            }),
        }
    }

    /// Number of middleware left in the chain.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining.len())
            .finish()
    }
}

/// A middleware created from a closure.
///
/// Build one with [`middleware_fn`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a mut RequestContext, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.func)(w, req, next)
    }
}

/// Creates a middleware from a closure.
///
/// # Example
///
/// ```
/// use vertex_middleware::middleware_fn;
///
/// let timing = middleware_fn("timing", |w, req, next| {
///     Box::pin(async move {
///         let result = next.run(w, req).await;
///         tracing::info!(elapsed = ?req.elapsed(), "request done");
///         result
///     })
/// });
/// ```
pub const fn middleware_fn<F>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a mut RequestContext, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware { name, func }
}
