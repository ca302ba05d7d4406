//! The HTTP/1 server.
//!
//! # Example
//!
//! ```rust,ignore
//! use vertex_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = build_registry()?;
//!     Server::builder()
//!         .config(ServerConfig::builder().listen(":9944").build())
//!         .registry(registry)
//!         .build()?
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

use crate::config::ServerConfig;
use crate::dispatch::{error_response, HttpResponse};
use crate::error::ServerError;
use crate::registry::FrozenRegistry;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Serves a frozen registry over HTTP/1.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    registry: Arc<FrozenRegistry>,
}

impl Server {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The served registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<FrozenRegistry> {
        &self.registry
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or cannot be bound.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or cannot be bound.
    pub async fn serve_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Fails if the listener's local address cannot be read.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        vertex_telemetry::metrics::describe_metrics();
        tracing::info!(addr = %listener.local_addr()?, routes = self.registry.len(), "listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(err) = server.handle_connection(stream, peer, shutdown).await {
                                tracing::debug!(%peer, error = %err, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to accept connection");
                    }
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?timeout,
            connections = tracker.active_connections(),
            "waiting for connections to close"
        );
        tokio::select! {
            () = tracker.wait_idle() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(timeout) => tracing::warn!(
                connections = tracker.active_connections(),
                "shutdown timeout reached"
            ),
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req, peer).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>, peer: SocketAddr) -> HttpResponse {
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(self.config.client_timeout(), body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(err)) => {
                tracing::warn!(%peer, error = %err, "failed to read request body");
                return error_response(StatusCode::BAD_REQUEST, "Error reading request");
            }
            Err(_) => {
                tracing::warn!(%peer, path = %parts.uri.path(), "request body timed out");
                return error_response(StatusCode::REQUEST_TIMEOUT, "Request Timeout");
            }
        };

        self.registry
            .handle(Request::from_parts(parts, body), Some(peer))
            .await
    }
}

/// Builder for [`Server`].
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    registry: Option<Arc<FrozenRegistry>>,
}

impl ServerBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the registry to serve.
    #[must_use]
    pub fn registry(mut self, registry: Arc<FrozenRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::MissingRegistry`] if no registry was set.
    pub fn build(self) -> Result<Server, ServerError> {
        Ok(Server {
            config: self.config,
            registry: self.registry.ok_or(ServerError::MissingRegistry)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Api, MethodFlag, Route};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use vertex_core::Reply;
    use vertex_schema::handler_fn;

    fn registry() -> Arc<FrozenRegistry> {
        crate::Registry::builder()
            .api(Api::new("svc", "1").route(Route::new(
                "/echo/{word}",
                MethodFlag::GET | MethodFlag::POST,
                handler_fn(|_w, req| {
                    let word = req.form_value("word").to_string();
                    Box::pin(async move { Ok(Reply::text(word)) })
                }),
            )))
            .freeze()
            .unwrap()
    }

    async fn start(config: ServerConfig) -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<Result<(), ServerError>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let server = Server::builder().config(config).registry(registry()).build().unwrap();
        let handle = tokio::spawn(server.serve_on(listener, shutdown.clone()));
        (addr, shutdown, handle)
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_build_requires_registry() {
        assert!(matches!(Server::builder().build(), Err(ServerError::MissingRegistry)));
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let server = Server::builder()
            .config(ServerConfig::builder().listen("not-an-address").build())
            .registry(registry())
            .build()
            .unwrap();
        let result = server.serve_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn test_serves_and_shuts_down() {
        let config = ServerConfig::builder()
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let (addr, shutdown, handle) = start(config).await;

        let response = roundtrip(
            addr,
            "GET /svc/1/echo/hello HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("hello"));

        let response = roundtrip(
            addr,
            "GET /nowhere HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404"));

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_slow_body_times_out() {
        let config = ServerConfig::builder()
            .client_timeout(Duration::from_millis(50))
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let (addr, shutdown, _handle) = start(config).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"POST /svc/1/echo/x HTTP/1.1\r\nhost: localhost\r\ncontent-length: 10\r\n\r\nabc")
            .await
            .unwrap();

        let mut buf = vec![0u8; 1024];
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).starts_with("HTTP/1.1 408"));

        shutdown.trigger();
    }
}
