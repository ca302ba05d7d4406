//! Versioned API definitions.

use crate::render::{JsonRenderer, SharedRenderer};
use crate::route::Route;
use crate::security::SharedSecurity;
use std::fmt;
use std::sync::Arc;
use vertex_middleware::BoxedMiddleware;

/// A single versioned API: its routes, middleware and defaults.
///
/// Every route is served under [`Api::root`], which is `/<name>/<version>`
/// unless set explicitly.
///
/// # Example
///
/// ```
/// use vertex_server::Api;
///
/// let api = Api::new("users", "1.0").title("User service");
/// assert_eq!(api.root(), "/users/1.0");
/// assert_eq!(api.full_path("/list/{id}"), "/users/1.0/list/{id}");
/// ```
pub struct Api {
    pub(crate) name: String,
    pub(crate) title: String,
    pub(crate) version: String,
    pub(crate) root: Option<String>,
    pub(crate) doc: String,
    pub(crate) default_security: Option<SharedSecurity>,
    pub(crate) renderer: SharedRenderer,
    pub(crate) routes: Vec<Route>,
    pub(crate) middleware: Vec<BoxedMiddleware>,
    pub(crate) swagger_middleware: Vec<BoxedMiddleware>,
    pub(crate) allow_insecure: bool,
}

impl Api {
    /// Creates an API with a JSON renderer and no routes.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            version: version.into(),
            root: None,
            doc: String::new(),
            default_security: None,
            renderer: Arc::new(JsonRenderer),
            routes: Vec::new(),
            middleware: Vec::new(),
            swagger_middleware: Vec::new(),
            allow_insecure: false,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the documentation text.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Overrides the root path.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the security scheme used by routes without their own.
    #[must_use]
    pub fn security(mut self, scheme: SharedSecurity) -> Self {
        self.default_security = Some(scheme);
        self
    }

    /// Sets the renderer used by routes without their own.
    #[must_use]
    pub fn renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Appends API middleware. It runs before any route middleware.
    #[must_use]
    pub fn with_middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends several API middleware, keeping their order.
    #[must_use]
    pub fn middleware<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        self.middleware.extend(middleware);
        self
    }

    /// Sets the middleware wrapping `GET <root>/swagger`.
    ///
    /// The docs route runs neither the API middleware nor its default
    /// security scheme.
    #[must_use]
    pub fn swagger_middleware<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        self.swagger_middleware = middleware.into_iter().collect();
        self
    }

    /// Serves the API over plain HTTP to non-local clients too.
    #[must_use]
    pub const fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// The API name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The API version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The root path of every route.
    #[must_use]
    pub fn root(&self) -> String {
        match &self.root {
            Some(root) => join_paths(root, ""),
            None => join_paths(&format!("/{}/{}", self.name, self.version), ""),
        }
    }

    /// Joins a route path onto the API root.
    #[must_use]
    pub fn full_path(&self, relative: &str) -> String {
        join_paths(&self.root(), relative)
    }

    /// The registered routes.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("root", &self.root())
            .field("routes", &self.routes)
            .field("allow_insecure", &self.allow_insecure)
            .finish_non_exhaustive()
    }
}

/// Joins two paths, collapsing slashes and resolving `.` and `..`.
///
/// The result always starts with `/` and never ends with one, except for
/// the root itself.
pub(crate) fn join_paths(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root() {
        let api = Api::new("users", "1.0");
        assert_eq!(api.root(), "/users/1.0");
        assert_eq!(api.full_path("/swagger"), "/users/1.0/swagger");
    }

    #[test]
    fn test_explicit_root() {
        let api = Api::new("users", "1.0").with_root("/api//users/");
        assert_eq!(api.root(), "/api/users");
        assert_eq!(api.full_path("get/{id}/"), "/api/users/get/{id}");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/a/b", "/c"), "/a/b/c");
        assert_eq!(join_paths("/a/b", "../c"), "/a/c");
        assert_eq!(join_paths("/a", "./b/"), "/a/b");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("/a", "/"), "/a");
    }
}
