//! Server configuration.
//!
//! ```
//! use vertex_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .listen(":8080")
//!     .client_timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert_eq!(config.listen(), "0.0.0.0:8080");
//! ```

use crate::error::ServerError;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9944";

/// Default time allowed for reading a request body, in seconds.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 60;

/// Default time allowed for open connections to finish on shutdown, in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    listen: String,
    client_timeout: Duration,
    shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Creates a builder with default values.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// The listen address, host always present.
    #[must_use]
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidAddress`] if it is not `host:port`
    /// with a literal IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listen.parse().map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress {
            addr: self.listen.clone(),
            reason: e.to_string(),
        })
    }

    /// Time allowed for reading a request body.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        self.client_timeout
    }

    /// Time allowed for open connections to finish on shutdown.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    listen: String,
    client_timeout: Duration,
    shutdown_timeout: Duration,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            client_timeout: Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

impl ServerConfigBuilder {
    /// Sets the listen address. A bare `:port` binds every interface.
    #[must_use]
    pub fn listen(mut self, addr: impl Into<String>) -> Self {
        self.listen = normalize_listen(&addr.into());
        self
    }

    /// Sets the body read timeout.
    #[must_use]
    pub const fn client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    /// Sets the shutdown drain timeout.
    #[must_use]
    pub const fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            listen: self.listen,
            client_timeout: self.client_timeout,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

/// Prefixes `0.0.0.0` to addresses of the form `:port`.
///
/// ```
/// assert_eq!(vertex_server::normalize_listen(":9944"), "0.0.0.0:9944");
/// assert_eq!(vertex_server::normalize_listen("127.0.0.1:80"), "127.0.0.1:80");
/// ```
#[must_use]
pub fn normalize_listen(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen(), DEFAULT_LISTEN);
        assert_eq!(config.client_timeout(), Duration::from_secs(60));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::builder().listen("127.0.0.1:3000").build();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(addr.ip().is_loopback());

        let config = ServerConfig::builder().listen(":9000").build();
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_socket_addr_invalid() {
        let config = ServerConfig::builder().listen("localhost").build();
        assert!(matches!(
            config.socket_addr(),
            Err(ServerError::InvalidAddress { ref addr, .. }) if addr == "localhost"
        ));
    }
}
