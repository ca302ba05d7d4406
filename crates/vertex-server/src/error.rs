//! Error types for registration, rendering and serving.

use thiserror::Error;
use vertex_docs::DocsError;
use vertex_router::RouteError;
use vertex_schema::SchemaError;

/// Errors raised while freezing a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A handler's input shape could not be turned into a schema.
    #[error("invalid handler for {path}: {source}")]
    Schema {
        /// Full path of the route.
        path: String,
        /// The extraction failure.
        #[source]
        source: SchemaError,
    },

    /// A route collides with another registration or is malformed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The Swagger document of an API could not be assembled.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// A route allows no methods at all.
    #[error("route {path} allows no methods")]
    NoMethods {
        /// Full path of the route.
        path: String,
    },

    /// Nothing was registered.
    #[error("registry has no routes")]
    Empty,
}

/// Errors raised by a [`Renderer`](crate::Renderer).
#[derive(Debug, Error)]
pub enum RenderError {
    /// The reply could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A custom renderer failed.
    #[error("render failed: {0}")]
    Custom(String),
}

/// Errors raised by the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is not a socket address.
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address.
        addr: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The builder was missing a registry.
    #[error("server has no registry")]
    MissingRegistry,

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::NoMethods {
            path: "/users/v1/list".to_string(),
        };
        assert_eq!(err.to_string(), "route /users/v1/list allows no methods");
        assert_eq!(RegistryError::Empty.to_string(), "registry has no routes");
    }

    #[test]
    fn test_route_error_is_transparent() {
        let err: RegistryError = RouteError::WildcardNotLast {
            path: "/a/*b/c".to_string(),
        }
        .into();
        assert!(err.to_string().contains("/a/*b/c"));
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::InvalidAddress {
            addr: "nowhere".to_string(),
            reason: "invalid socket address syntax".to_string(),
        };
        assert!(err.to_string().starts_with("invalid listen address 'nowhere'"));
    }
}
