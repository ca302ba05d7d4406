//! Path router for Vertex APIs.
//!
//! Routes are registered as path templates with `{name}` placeholders and an
//! optional trailing `*name` catch-all. Each template carries a
//! [`MethodRouter`] that maps HTTP methods to an arbitrary route value, which
//! the server uses as an index into its frozen route table.
//!
//! # Example
//!
//! ```rust
//! use vertex_router::{Lookup, MethodRouter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/users/v1/users", MethodRouter::new().get(0).post(1)).unwrap();
//! router.insert("/users/v1/users/{id}", MethodRouter::new().get(2)).unwrap();
//!
//! let m = router.match_route(&Method::GET, "/users/v1/users/123").unwrap();
//! assert_eq!(*m.value, 2);
//! assert_eq!(m.params.get("id"), Some("123"));
//!
//! assert!(matches!(
//!     router.lookup(&Method::DELETE, "/users/v1/users"),
//!     Lookup::MethodNotAllowed(_)
//! ));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐        "*path"
//!        │           │
//!       (leaf)    "{id}"
//!   [GET,POST]      │
//!                 (leaf)
//!              [GET,DELETE]
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::{Capture, PathParam, PathParams};
pub use router::{Lookup, Router};

/// A matched route with its value and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the route
    pub value: &'a T,
    /// Extracted path parameters
    pub params: PathParams,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, params: PathParams) -> Self {
        Self { value, params }
    }
}
