//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `[server]` section.
///
/// ```
/// use vertex_config::ServerSection;
///
/// let server = ServerSection::default();
/// assert_eq!(server.listen, ":9944");
/// assert_eq!(server.listen_addr(), "0.0.0.0:9944");
/// assert_eq!(server.logging_level, "INFO");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Listen address, e.g. `:8080` or `127.0.0.1:8080`.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Serve plain HTTP to non-local clients. Development only.
    #[serde(default)]
    pub allow_insecure: bool,

    /// Directory holding the console UI files. Empty disables the console.
    #[serde(default = "default_console_files_path")]
    pub console_files_path: String,

    /// Minimal log level: `DEBUG`, `INFO`, `WARN`, `ERROR` or `CRITICAL`.
    #[serde(default = "default_logging_level")]
    pub logging_level: String,

    /// Seconds allowed for a client to send its request.
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: u64,

    /// Seconds allowed for open connections to finish on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            allow_insecure: false,
            console_files_path: default_console_files_path(),
            logging_level: default_logging_level(),
            client_timeout_secs: default_client_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSection {
    /// The listen address with the host filled in for `:port` forms.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        let listen = self.listen.trim();
        if listen.starts_with(':') {
            format!("0.0.0.0{listen}")
        } else {
            listen.to_string()
        }
    }

    /// The client timeout.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    /// The shutdown timeout.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn default_listen() -> String {
    ":9944".to_string()
}

fn default_console_files_path() -> String {
    "../console".to_string()
}

fn default_logging_level() -> String {
    "INFO".to_string()
}

const fn default_client_timeout() -> u64 {
    60
}

const fn default_shutdown_timeout() -> u64 {
    30
}

/// The `[auth]` section: credentials protecting internal pages.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// User name.
    #[serde(default = "default_user")]
    pub user: String,

    /// Password.
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
        }
    }
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_user() -> String {
    "vertext".to_string()
}

fn default_password() -> String {
    "xetrev".to_string()
}
