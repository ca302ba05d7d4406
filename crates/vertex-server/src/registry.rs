//! The route registry.
//!
//! Registration happens in two phases. A [`RegistryBuilder`] collects APIs
//! on a single thread at startup. [`RegistryBuilder::freeze`] then extracts
//! every handler schema, builds each route's middleware chain, fills the
//! router and returns a read-only [`FrozenRegistry`] that is shared by all
//! connections without locking.

use crate::api::Api;
use crate::dispatch::{error_response, Dispatcher, HttpResponse};
use crate::error::RegistryError;
use crate::handlers::{RedirectHandler, StaticHandler};
use crate::render::SharedRenderer;
use crate::route::MethodFlag;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use vertex_core::{FormValues, Reply};
use vertex_docs::{SwaggerBuilder, SwaggerDoc};
use vertex_middleware::{BindAndInvoke, Chain};
use vertex_router::{Lookup, MethodRouter, Router};
use vertex_schema::{extract_request_info, handler_fn, HandlerDescriptor, SchemaError};

/// Path the console UI is served under.
pub const CONSOLE_PATH: &str = "/console";

/// Entry point for building a registry.
#[derive(Debug, Clone, Copy)]
pub struct Registry;

impl Registry {
    /// Creates an empty registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }
}

/// Collects APIs until the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    apis: Vec<Api>,
    console: Option<PathBuf>,
}

impl RegistryBuilder {
    /// Adds an API.
    #[must_use]
    pub fn api(mut self, api: Api) -> Self {
        self.apis.push(api);
        self
    }

    /// Serves the API console from `dir` under `/console/`.
    ///
    /// Every API then also answers `GET <root>/console` with a redirect to
    /// the console, pointed at the API's Swagger document.
    #[must_use]
    pub fn console(mut self, dir: impl Into<PathBuf>) -> Self {
        self.console = Some(dir.into());
        self
    }

    /// Freezes the registry.
    ///
    /// Every API also gets a `GET <root>/swagger` route serving its
    /// Swagger document. It runs the API's swagger middleware only and no
    /// security scheme.
    ///
    /// # Errors
    ///
    /// Fails on the first handler with an unsupported shape, route without
    /// methods, conflicting path, or when no route was registered at all.
    pub fn freeze(self) -> Result<Arc<FrozenRegistry>, RegistryError> {
        let mut router = Router::new();
        let mut apis = Vec::with_capacity(self.apis.len());

        for api in self.apis {
            let root = api.root();
            let mut docs = SwaggerBuilder::new(api.title.clone(), api.version.clone())
                .description(api.doc.clone())
                .base_path(root.clone())
                .allow_insecure(api.allow_insecure)
                .produces(api.renderer.content_types());

            for route in &api.routes {
                let full_path = api.full_path(&route.path);
                let descriptor = route.handler.clone().map_err(|source| RegistryError::Schema {
                    path: full_path.clone(),
                    source,
                })?;

                let methods = route.methods.methods();
                if methods.is_empty() {
                    return Err(RegistryError::NoMethods { path: full_path });
                }

                let info = extract_request_info(&route.path, &route.description, descriptor.shape())
                    .map_err(|source| RegistryError::Schema {
                        path: full_path.clone(),
                        source,
                    })?;
                docs = docs.route(&info, &methods, route.returns.as_deref());

                let chain = Chain::builder()
                    .extend(api.middleware.iter().cloned())
                    .extend(route.middleware.iter().cloned())
                    .terminal(BindAndInvoke::new(descriptor))
                    .build();

                let dispatcher = Arc::new(Dispatcher::new(
                    full_path.clone(),
                    chain,
                    route.security.clone().or_else(|| api.default_security.clone()),
                    route.renderer.clone().unwrap_or_else(|| Arc::clone(&api.renderer)),
                    api.allow_insecure,
                ));

                insert(&mut router, &full_path, &methods, &dispatcher)?;
                tracing::info!(
                    api = %api.name,
                    path = %full_path,
                    methods = ?methods,
                    stages = ?dispatcher.chain().stage_names(),
                    "registered route"
                );
            }

            let swagger_path = api.full_path("/swagger");
            let swagger = Arc::new(Dispatcher::new(
                swagger_path.clone(),
                Chain::builder()
                    .extend(api.swagger_middleware.iter().cloned())
                    .terminal(BindAndInvoke::new(swagger_handler(docs.build()?)))
                    .build(),
                None,
                Arc::clone(&api.renderer),
                api.allow_insecure,
            ));
            insert(&mut router, &swagger_path, &MethodFlag::GET.methods(), &swagger)?;

            if self.console.is_some() {
                let mut query = FormValues::new();
                query.set("url", swagger_path.as_str());
                let redirect = RedirectHandler::permanent(format!("{CONSOLE_PATH}/?{}", query.encode()));
                let console_path = api.full_path(CONSOLE_PATH);
                let dispatcher = bare_dispatcher(&console_path, redirect.descriptor(), &api.renderer)?;
                insert(&mut router, &console_path, &MethodFlag::GET.methods(), &dispatcher)?;
            }

            apis.push(ApiInfo {
                name: api.name.clone(),
                version: api.version.clone(),
                root,
                routes: api.routes.len(),
            });
        }

        if apis.iter().all(|api| api.routes == 0) {
            return Err(RegistryError::Empty);
        }

        if let Some(dir) = self.console {
            tracing::info!(dir = %dir.display(), path = CONSOLE_PATH, "serving console");
            let files = StaticHandler::new(CONSOLE_PATH, dir).descriptor();
            let renderer: SharedRenderer = Arc::new(crate::render::JsonRenderer);
            let dispatcher = bare_dispatcher(CONSOLE_PATH, files, &renderer)?;
            let get = MethodFlag::GET.methods();
            insert(&mut router, CONSOLE_PATH, &get, &dispatcher)?;
            insert(&mut router, &format!("{CONSOLE_PATH}/*filepath"), &get, &dispatcher)?;
        }

        tracing::info!(apis = apis.len(), routes = router.len(), "registry frozen");
        Ok(Arc::new(FrozenRegistry { router, apis }))
    }
}

fn insert(
    router: &mut Router<Arc<Dispatcher>>,
    path: &str,
    methods: &[Method],
    dispatcher: &Arc<Dispatcher>,
) -> Result<(), RegistryError> {
    let entry = methods.iter().fold(MethodRouter::new(), |entry, method| {
        entry.method(method.clone(), Arc::clone(dispatcher))
    });
    router.insert(path, entry)?;
    Ok(())
}

/// A dispatcher outside any API: no middleware, no security, and no
/// refusal of plain HTTP.
fn bare_dispatcher(
    path: &str,
    descriptor: Result<HandlerDescriptor, SchemaError>,
    renderer: &SharedRenderer,
) -> Result<Arc<Dispatcher>, RegistryError> {
    let descriptor = descriptor.map_err(|source| RegistryError::Schema {
        path: path.to_string(),
        source,
    })?;
    Ok(Arc::new(Dispatcher::new(
        path,
        Chain::builder().terminal(BindAndInvoke::new(descriptor)).build(),
        None,
        Arc::clone(renderer),
        true,
    )))
}

fn swagger_handler(doc: SwaggerDoc) -> HandlerDescriptor {
    let doc = Arc::new(doc);
    handler_fn(move |_w, req| {
        let mut doc = doc.as_ref().clone();
        doc.host = req.header("host").unwrap_or_default().to_string();
        let reply = Reply::json(&doc);
        Box::pin(async move { reply })
    })
}

/// Summary of a registered API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    /// API name.
    pub name: String,
    /// API version.
    pub version: String,
    /// Root path.
    pub root: String,
    /// Number of declared routes, not counting the docs route.
    pub routes: usize,
}

/// A frozen, read-only registry.
///
/// # Example
///
/// ```
/// use vertex_core::Reply;
/// use vertex_schema::handler_fn;
/// use vertex_server::{Api, MethodFlag, Registry, Route};
///
/// let registry = Registry::builder()
///     .api(Api::new("svc", "1").route(Route::new(
///         "/ping",
///         MethodFlag::GET,
///         handler_fn(|_w, _req| Box::pin(async { Ok(Reply::text("pong")) })),
///     )))
///     .freeze()
///     .unwrap();
///
/// assert!(registry.resolve(&http::Method::GET, "/svc/1/ping").is_some());
/// assert!(registry.resolve(&http::Method::GET, "/svc/1/swagger").is_some());
/// ```
#[derive(Debug)]
pub struct FrozenRegistry {
    router: Router<Arc<Dispatcher>>,
    apis: Vec<ApiInfo>,
}

impl FrozenRegistry {
    /// Finds the dispatcher and path parameters for a request.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<(&Dispatcher, vertex_router::PathParams)> {
        self.router
            .match_route(method, path)
            .map(|m| (m.value.as_ref(), m.params))
    }

    /// Looks up a request, telling a missing path apart from a wrong method.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, Arc<Dispatcher>> {
        self.router.lookup(method, path)
    }

    /// Handles a request whose body was already collected.
    ///
    /// Unknown paths get `404`, known paths with another method `405`.
    pub async fn handle(&self, request: Request<Bytes>, peer: Option<SocketAddr>) -> HttpResponse {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match self.router.lookup(&method, &path) {
            Lookup::Found(m) => m.value.dispatch(request, peer, &m.params).await,
            Lookup::MethodNotAllowed(allowed) => {
                tracing::debug!(%method, %path, "method not allowed");
                let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                if let Ok(value) = http::HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(http::header::ALLOW, value);
                }
                response
            }
            Lookup::NotFound => {
                tracing::debug!(%method, %path, "no route");
                error_response(StatusCode::NOT_FOUND, "404 page not found")
            }
        }
    }

    /// The registered APIs.
    #[must_use]
    pub fn apis(&self) -> &[ApiInfo] {
        &self.apis
    }

    /// Number of `(method, path)` pairs served, including docs routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns `true` if nothing is served.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }
}
