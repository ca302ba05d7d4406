//! # Vertex Middleware
//!
//! Middleware chains for the Vertex API framework.
//!
//! Every route owns an immutable [`Chain`]: the API's middleware, then the
//! route's middleware, then a synthesized [`BindAndInvoke`] terminal.
//!
//! ```text
//! Request → API middleware… → route middleware… → BindAndInvoke → handler
//! ```
//!
//! Any element can short-circuit by returning without calling
//! [`Next::run`]. Post-processing happens after `next.run(..).await`
//! returns.
//!
//! ## Example
//!
//! ```
//! use vertex_core::Reply;
//! use vertex_middleware::{middleware_fn, stages, Chain};
//!
//! let chain = Chain::builder()
//!     .extend(stages::default_middleware())
//!     .terminal(middleware_fn("hello", |_w, _req, _next| {
//!         Box::pin(async { Ok(Reply::text("hello")) })
//!     }))
//!     .build();
//!
//! assert_eq!(chain.len(), 4);
//! assert_eq!(chain.stage_names()[0], "auto_recover");
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;
pub mod terminal;

pub use chain::{BoxedMiddleware, Chain, ChainBuilder};
pub use middleware::{middleware_fn, FnMiddleware, Middleware, Next};
pub use stages::default_middleware;
pub use terminal::BindAndInvoke;
