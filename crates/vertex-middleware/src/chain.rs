//! Immutable per-route middleware chains.
//!
//! A [`Chain`] is built once per route when the registry is frozen: the
//! API's middleware, then the route's own middleware, then a terminal that
//! binds and invokes the handler. Every request walks the same chain.

use crate::middleware::{Middleware, Next};
use std::fmt;
use std::sync::Arc;
use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// A type-erased middleware that can be stored in a chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, shareable middleware chain.
///
/// # Example
///
/// ```
/// use vertex_core::Reply;
/// use vertex_middleware::{middleware_fn, Chain};
///
/// let chain = Chain::builder()
///     .with(middleware_fn("noop", |w, req, next| next.run(w, req)))
///     .terminal(middleware_fn("reply", |_w, _req, _next| {
///         Box::pin(async { Ok(Reply::text("done")) })
///     }))
///     .build();
///
/// assert_eq!(chain.stage_names(), vec!["noop", "reply"]);
/// ```
#[derive(Clone)]
pub struct Chain {
    stages: Arc<[BoxedMiddleware]>,
}

impl Chain {
    /// Creates a chain builder.
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Runs a request through the chain.
    pub fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Next::new(&self.stages).run(w, req)
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for a [`Chain`].
#[derive(Default)]
pub struct ChainBuilder {
    stages: Vec<BoxedMiddleware>,
    terminal: Option<BoxedMiddleware>,
}

impl ChainBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware.
    #[must_use]
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends already shared middleware, keeping their order.
    #[must_use]
    pub fn extend<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        self.stages.extend(middleware);
        self
    }

    /// Sets the terminal element. It always runs last.
    #[must_use]
    pub fn terminal<M: Middleware>(mut self, middleware: M) -> Self {
        self.terminal = Some(Arc::new(middleware));
        self
    }

    /// Builds the chain.
    #[must_use]
    pub fn build(self) -> Chain {
        let mut stages = self.stages;
        stages.extend(self.terminal);
        Chain {
            stages: stages.into(),
        }
    }
}
