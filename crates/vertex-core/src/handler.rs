//! Shared handler result and future aliases.

use crate::error::ApiError;
use crate::response::Reply;
use std::future::Future;
use std::pin::Pin;

/// The outcome of a handler or a middleware chain.
pub type HandlerResult = Result<Reply, ApiError>;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
