//! # Vertex
//!
//! **A declarative framework for versioned HTTP APIs**
//!
//! Routes are described as metadata: the handler type, the path, the allowed
//! methods, middleware and a security scheme. Vertex then:
//!
//! - binds request data (path, query, form and headers) into handler fields
//! - applies defaults and validates every field against its declared schema
//! - runs the API and route middleware around the handler
//! - renders the handler's result or error, JSON by default
//! - serves a Swagger 2.0 document for each API under `<root>/swagger`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vertex::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_env_prefix("VERTEX").load()?;
//!     init_logging(&config.log_config()?)?;
//!
//!     let registry = Registry::builder()
//!         .api(Api::new("hello", "1.0").route(Route::new(
//!             "/greet/{name}",
//!             MethodFlag::GET,
//!             handler_fn(|_w, req| {
//!                 let name = req.form_value("name").to_string();
//!                 Box::pin(async move { Ok(Reply::text(format!("hello {name}"))) })
//!             }),
//!         )))
//!         .freeze()?;
//!
//!     vertex::serve(&config, registry).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request pipeline
//!
//! ```text
//! Request → Router → insecure check → Security → API middleware → Route middleware
//!                                                                       ↓
//! Response ← Renderer ← Validate ← Defaults ← Bind ← fresh handler ←────┘
//! ```

#![doc(html_root_url = "https://docs.rs/vertex/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

pub use vertex_config as config;
pub use vertex_core as core;
pub use vertex_docs as docs;
pub use vertex_middleware as middleware;
pub use vertex_router as router;
pub use vertex_schema as schema;
pub use vertex_server as server;
pub use vertex_telemetry as telemetry;

use vertex_config::VertexConfig;
use vertex_server::{FrozenRegistry, Registry, RegistryBuilder, Server, ServerConfig, ServerError};

/// The crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the HTTP server settings from a loaded configuration.
///
/// ```
/// use std::time::Duration;
/// use vertex::config::VertexConfig;
///
/// let mut config = VertexConfig::default();
/// config.server.client_timeout_secs = 5;
///
/// let server = vertex::server_config(&config);
/// assert_eq!(server.listen(), "0.0.0.0:9944");
/// assert_eq!(server.client_timeout(), Duration::from_secs(5));
/// ```
#[must_use]
pub fn server_config(config: &VertexConfig) -> ServerConfig {
    ServerConfig::builder()
        .listen(config.server.listen_addr())
        .client_timeout(config.server.client_timeout())
        .shutdown_timeout(config.server.shutdown_timeout())
        .build()
}

/// Starts a registry for `config`.
///
/// The console UI is served from `server.console_files_path` unless that
/// path is empty.
#[must_use]
pub fn registry(config: &VertexConfig) -> RegistryBuilder {
    let builder = Registry::builder();
    match config.server.console_files_path.as_str() {
        "" => builder,
        dir => builder.console(dir),
    }
}

/// Serves `registry` with the settings of `config` until a shutdown signal.
///
/// API config sections that match no registered API are logged as warnings.
pub async fn serve(config: &VertexConfig, registry: Arc<FrozenRegistry>) -> Result<(), ServerError> {
    config.warn_unregistered(registry.apis().iter().map(|api| api.name.as_str()));

    tracing::info!(
        version = VERSION,
        listen = %config.server.listen_addr(),
        apis = registry.apis().len(),
        "starting vertex server"
    );

    Server::builder()
        .config(server_config(config))
        .registry(registry)
        .build()?
        .serve()
        .await
}

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use vertex::prelude::*;
/// ```
pub mod prelude {
    pub use vertex_core::{
        ApiError, ApiResult, BoxFuture, ErrorKind, HandlerResult, Reply, RequestContext,
        ResponseWriter,
    };

    pub use vertex_schema::{
        handler_fn, BindError, Bindable, DescribeInput, FieldDecl, FieldRef, HandlerDescriptor,
        InputShape, RequestHandler, Unmarshaler, Value,
    };

    pub use vertex_middleware::{
        default_middleware, middleware_fn, BoxedMiddleware, Middleware, Next,
    };

    pub use vertex_server::{
        security_fn, Api, FrozenRegistry, MethodFlag, Registry, Route, SecurityScheme, Server,
        ServerConfig, StaticHandler, VoidHandler,
    };

    pub use vertex_config::{ConfigLoader, VertexConfig};
    pub use vertex_telemetry::{init_logging, LogConfig, LogLevel};
}
