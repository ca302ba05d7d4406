//! High-level router API.
//!
//! This module provides the main [`Router`] struct which is the primary
//! interface for building and matching routes.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::PathParams;
use crate::RouteMatch;

/// Outcome of looking up a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// A route matched path and method.
    Found(RouteMatch<'a, T>),
    /// The path matched but not the method.
    MethodNotAllowed(Vec<Method>),
    /// Nothing matched.
    NotFound,
}

/// A segment tree router mapping `(method, path)` to route values.
///
/// # Example
///
/// ```rust
/// use vertex_router::{MethodRouter, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/users", MethodRouter::new().get(0).post(1)).unwrap();
/// router.insert("/users/{id}", MethodRouter::new().get(2)).unwrap();
///
/// let m = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*m.value, 2);
/// assert_eq!(m.params.get("id"), Some("123"));
/// ```
///
/// # Route Priority
///
/// When multiple routes could match, the router uses the following priority:
///
/// 1. **Static segments** (e.g., `/users/me`)
/// 2. **Parameter segments** (e.g., `/users/{id}`)
/// 3. **Wildcard segments** (e.g., `/files/*path`)
///
/// Empty segments are ignored, so a trailing slash matches the same route.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts the methods of one path template.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the template is malformed or collides
    /// with an existing registration.
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        let count = methods.allowed_methods().len();
        self.root.insert(path, methods)?;
        self.route_count += count;
        Ok(())
    }

    /// Adds a single-method route.
    ///
    /// # Errors
    ///
    /// Same as [`Router::insert`].
    pub fn route(&mut self, method: Method, path: &str, value: T) -> Result<(), RouteError> {
        self.insert(path, MethodRouter::new().method(method, value))
    }

    /// Matches a path and method against the router.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (methods, params) = self.root.match_path(path)?;
        let value = methods.get_value(method)?;
        Some(RouteMatch::new(value, params))
    }

    /// Matches a path against the router, without a method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, PathParams)> {
        self.root.match_path(path)
    }

    /// Looks up a request, telling a missing path apart from a wrong method.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        match self.root.match_path(path) {
            None => Lookup::NotFound,
            Some((methods, params)) => match methods.get_value(method) {
                Some(value) => Lookup::Found(RouteMatch::new(value, params)),
                None => Lookup::MethodNotAllowed(methods.allowed_methods()),
            },
        }
    }

    /// Returns the number of `(method, path)` pairs registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
