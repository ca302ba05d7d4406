//! # Vertex Server
//!
//! APIs, routes, the registry and the HTTP server of the Vertex framework.
//!
//! An [`Api`] groups [`Route`]s under a versioned root such as
//! `/users/1.0`. The [`Registry`] collects APIs and freezes them into a
//! read-only [`FrozenRegistry`], which routes each request to a
//! [`Dispatcher`]. The dispatcher enforces the secure-access gate, runs the
//! [`SecurityScheme`], the middleware chain and finally the [`Renderer`].
//! [`Server`] serves a frozen registry over HTTP/1 with graceful shutdown.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vertex_core::Reply;
//! use vertex_schema::handler_fn;
//! use vertex_server::{Api, MethodFlag, Registry, Route, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
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
//!     Server::builder()
//!         .config(ServerConfig::builder().listen(":9944").build())
//!         .registry(registry)
//!         .build()?
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
mod dispatch;
mod error;
mod handlers;
mod registry;
mod render;
mod route;
mod security;
mod server;
pub mod shutdown;

pub use api::Api;
pub use config::{
    normalize_listen, ServerConfig, ServerConfigBuilder, DEFAULT_CLIENT_TIMEOUT_SECS,
    DEFAULT_LISTEN, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use dispatch::{
    error_response, into_http_response, DispatchState, Dispatcher, HttpResponse, ResponseBody,
    INSECURE_ACCESS_MESSAGE,
};
pub use error::{RegistryError, RenderError, ServerError};
pub use handlers::{format_path, RedirectHandler, StaticHandler, VoidHandler};
pub use registry::{ApiInfo, FrozenRegistry, Registry, RegistryBuilder, CONSOLE_PATH};
pub use render::{
    write_api_error, write_meta_headers, JsonRenderer, RenderFn, Renderer, SharedRenderer,
    HEADER_PROCESSING_TIME, HEADER_REQUEST_ID,
};
pub use route::{MethodFlag, Route};
pub use security::{security_fn, SecurityFn, SecurityScheme, SharedSecurity};
pub use server::{Server, ServerBuilder};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
