//! Assembles a [`SwaggerDoc`] from route metadata.

use crate::error::{DocsError, DocsResult};
use crate::swagger::{Info, Method, Param, Response, SwaggerDoc, SWAGGER_VERSION};
use indexmap::IndexMap;
use vertex_schema::RequestInfo;

#[derive(Debug, Clone)]
struct RouteEntry {
    info: RequestInfo,
    methods: Vec<http::Method>,
    returns: Option<String>,
}

/// Builder for the Swagger document of one API.
///
/// # Example
///
/// ```rust
/// use vertex_docs::SwaggerBuilder;
/// use vertex_schema::RequestInfo;
///
/// let info = RequestInfo {
///     path: "/users".to_string(),
///     description: "List users".to_string(),
///     params: Vec::new(),
/// };
///
/// let doc = SwaggerBuilder::new("Users", "1.0")
///     .host("api.example.com")
///     .base_path("/users/v1")
///     .route(&info, &[http::Method::GET], None)
///     .build()
///     .unwrap();
///
/// assert_eq!(doc.schemes, vec!["https"]);
/// assert!(doc.paths["/users"].contains_key("get"));
/// ```
#[derive(Debug, Clone)]
pub struct SwaggerBuilder {
    title: String,
    version: String,
    description: String,
    host: String,
    base_path: String,
    allow_insecure: bool,
    consumes: Vec<String>,
    produces: Vec<String>,
    routes: Vec<RouteEntry>,
}

impl SwaggerBuilder {
    /// Creates a builder for an API title and version.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: String::new(),
            host: String::new(),
            base_path: "/".to_string(),
            allow_insecure: false,
            consumes: vec!["text/json".to_string()],
            produces: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Sets the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the serving host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the base path shared by every route.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Advertises plain `http` next to `https`.
    #[must_use]
    pub const fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Sets the request content types.
    #[must_use]
    pub fn consumes(mut self, content_types: Vec<String>) -> Self {
        self.consumes = content_types;
        self
    }

    /// Sets the response content types, usually the renderer's.
    #[must_use]
    pub fn produces(mut self, content_types: Vec<String>) -> Self {
        self.produces = content_types;
        self
    }

    /// Adds a route with its allowed methods and optional return type name.
    #[must_use]
    pub fn route(mut self, info: &RequestInfo, methods: &[http::Method], returns: Option<&str>) -> Self {
        self.routes.push(RouteEntry {
            info: info.clone(),
            methods: methods.to_vec(),
            returns: returns.map(ToString::to_string),
        });
        self
    }

    /// Builds the document.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::UnsupportedMethod`] for methods other than
    /// `GET`, `POST`, `PUT` and `DELETE`.
    pub fn build(self) -> DocsResult<SwaggerDoc> {
        let mut paths: IndexMap<String, IndexMap<String, Method>> = IndexMap::new();

        for route in &self.routes {
            let parameters: Vec<Param> = route.info.params.iter().map(Param::from_descriptor).collect();
            let entry = paths.entry(route.info.path.clone()).or_default();

            for method in &route.methods {
                let key = method_key(method).ok_or_else(|| DocsError::UnsupportedMethod {
                    path: route.info.path.clone(),
                    method: method.to_string(),
                })?;

                let mut responses = IndexMap::new();
                responses.insert(
                    "default".to_string(),
                    Response {
                        description: route.returns.clone().unwrap_or_default(),
                        schema: None,
                    },
                );

                entry.insert(
                    key.to_string(),
                    Method {
                        description: route.info.description.clone(),
                        parameters: parameters.clone(),
                        responses,
                        ..Method::default()
                    },
                );
            }
        }

        let schemes = if self.allow_insecure {
            vec!["http".to_string(), "https".to_string()]
        } else {
            vec!["https".to_string()]
        };

        Ok(SwaggerDoc {
            swagger: SWAGGER_VERSION.to_string(),
            info: Info {
                version: self.version,
                title: self.title,
                description: self.description,
            },
            host: self.host,
            base_path: self.base_path,
            schemes,
            consumes: self.consumes,
            produces: self.produces,
            paths,
        })
    }
}

fn method_key(method: &http::Method) -> Option<&'static str> {
    match *method {
        http::Method::GET => Some("get"),
        http::Method::POST => Some("post"),
        http::Method::PUT => Some("put"),
        http::Method::DELETE => Some("delete"),
        _ => None,
    }
}
