//! Typed, layered configuration for Vertex servers.
//!
//! [`VertexConfig`] has three sections:
//!
//! - [`ServerSection`]: listen address, insecure access, console files,
//!   logging level and timeouts
//! - [`AuthSection`]: credentials protecting internal pages
//! - `apis`: free-form tables, one per API, read with
//!   [`VertexConfig::api_config`]
//!
//! Unknown fields are rejected everywhere except inside `apis`.
//!
//! # Example
//!
//! ```no_run
//! use vertex_config::ConfigLoader;
//!
//! # fn main() -> Result<(), vertex_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("vertex.toml")?
//!     .with_env_prefix("VERTEX")
//!     .load()?;
//!
//! println!("listening on {}", config.server.listen);
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [server]
//! listen = ":9944"
//! allow_insecure = false
//! console_files_path = "../console"
//! logging_level = "INFO"
//! client_timeout_secs = 60
//!
//! [auth]
//! user = "admin"
//! password = "secret"
//!
//! [apis.users]
//! max_page_size = 100
//! ```
//!
//! # Environment Overrides
//!
//! Variables named `PREFIX__SECTION__KEY` override file values, e.g.
//! `VERTEX__SERVER__LISTEN=:8080` or `VERTEX__APIS__USERS__MAX_PAGE_SIZE=50`.

#![doc(html_root_url = "https://docs.rs/vertex-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::VertexConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AuthSection, ServerSection};

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
