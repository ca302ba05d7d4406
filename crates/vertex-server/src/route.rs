//! Route declarations.

use crate::render::SharedRenderer;
use crate::security::SharedSecurity;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use vertex_middleware::BoxedMiddleware;
use vertex_schema::{DescribeInput, HandlerDescriptor, RequestHandler, SchemaError};

/// A set of HTTP methods a route answers to.
///
/// # Example
///
/// ```
/// use vertex_server::MethodFlag;
///
/// let methods = MethodFlag::GET | MethodFlag::POST;
/// assert!(methods.contains(MethodFlag::POST));
/// assert!(!methods.contains(MethodFlag::DELETE));
/// assert_eq!(methods.methods(), vec![http::Method::GET, http::Method::POST]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodFlag(u8);

impl MethodFlag {
    /// `GET`
    pub const GET: Self = Self(1);
    /// `POST`
    pub const POST: Self = Self(2);
    /// `PUT`
    pub const PUT: Self = Self(4);
    /// `DELETE`
    pub const DELETE: Self = Self(8);
    /// Every supported method.
    pub const ALL: Self = Self(1 | 2 | 4 | 8);

    const TABLE: [(Self, http::Method); 4] = [
        (Self::GET, http::Method::GET),
        (Self::POST, http::Method::POST),
        (Self::PUT, http::Method::PUT),
        (Self::DELETE, http::Method::DELETE),
    ];

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every method in `other` is in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` for the empty set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the HTTP methods in the set, in `GET, POST, PUT, DELETE` order.
    #[must_use]
    pub fn methods(self) -> Vec<http::Method> {
        Self::TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, method)| method.clone())
            .collect()
    }
}

impl BitOr for MethodFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MethodFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One path of an API, bound to a handler.
///
/// The path is relative to the API root and may contain `{name}`
/// placeholders, which are merged into the request form.
///
/// # Example
///
/// ```
/// use vertex_core::Reply;
/// use vertex_schema::handler_fn;
/// use vertex_server::{MethodFlag, Route};
///
/// let route = Route::new(
///     "/ping",
///     MethodFlag::GET,
///     handler_fn(|_w, _req| Box::pin(async { Ok(Reply::text("pong")) })),
/// )
/// .description("Liveness check");
///
/// assert_eq!(route.path(), "/ping");
/// ```
pub struct Route {
    pub(crate) path: String,
    pub(crate) description: String,
    pub(crate) methods: MethodFlag,
    pub(crate) handler: Result<HandlerDescriptor, SchemaError>,
    pub(crate) security: Option<SharedSecurity>,
    pub(crate) renderer: Option<SharedRenderer>,
    pub(crate) middleware: Vec<BoxedMiddleware>,
    pub(crate) returns: Option<String>,
}

impl Route {
    /// Creates a route for a described handler.
    pub fn new(path: impl Into<String>, methods: MethodFlag, handler: HandlerDescriptor) -> Self {
        Self::from_result(path.into(), methods, Ok(handler))
    }

    /// Creates a route for a struct handler type.
    ///
    /// Schema errors surface when the registry is frozen.
    pub fn handler<H>(path: impl Into<String>, methods: MethodFlag) -> Self
    where
        H: RequestHandler + DescribeInput + Default,
    {
        Self::from_result(path.into(), methods, HandlerDescriptor::of::<H>())
    }

    pub(crate) fn from_result(
        path: String,
        methods: MethodFlag,
        handler: Result<HandlerDescriptor, SchemaError>,
    ) -> Self {
        Self {
            path,
            description: String::new(),
            methods,
            handler,
            security: None,
            renderer: None,
            middleware: Vec::new(),
            returns: None,
        }
    }

    /// Sets the description shown in the docs.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Overrides the API's security scheme.
    #[must_use]
    pub fn security(mut self, scheme: SharedSecurity) -> Self {
        self.security = Some(scheme);
        self
    }

    /// Overrides the API's renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Appends route middleware. It runs after the API middleware.
    #[must_use]
    pub fn with_middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Names the returned type, for the docs.
    #[must_use]
    pub fn returns(mut self, type_name: impl Into<String>) -> Self {
        self.returns = Some(type_name.into());
        self
    }

    /// Path relative to the API root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Allowed methods.
    #[must_use]
    pub const fn methods(&self) -> MethodFlag {
        self.methods
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("methods", &self.methods.methods())
            .field("handler", &self.handler.as_ref().map(HandlerDescriptor::type_name))
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_flag_values() {
        assert_eq!(MethodFlag::GET.bits(), 1);
        assert_eq!(MethodFlag::POST.bits(), 2);
        assert_eq!(MethodFlag::PUT.bits(), 4);
        assert_eq!(MethodFlag::DELETE.bits(), 8);
        assert!(MethodFlag::empty().is_empty());
    }

    #[test]
    fn test_method_flag_methods() {
        let mut flags = MethodFlag::DELETE;
        flags |= MethodFlag::GET;
        assert_eq!(flags.methods(), vec![http::Method::GET, http::Method::DELETE]);
        assert_eq!(MethodFlag::ALL.methods().len(), 4);
        assert!(MethodFlag::empty().methods().is_empty());
    }
}
