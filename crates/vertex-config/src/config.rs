//! The root configuration type.

use crate::{AuthSection, ConfigError, ServerSection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vertex_telemetry::{LogConfig, LogLevel};

/// Complete Vertex configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// ```
/// use vertex_config::VertexConfig;
///
/// let config = VertexConfig::default();
/// assert_eq!(config.server.listen, ":9944");
/// assert!(config.apis.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VertexConfig {
    /// Server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Credentials for internal pages.
    #[serde(default)]
    pub auth: AuthSection,

    /// Free-form per-API sections, keyed by API name.
    #[serde(default)]
    pub apis: BTreeMap<String, serde_json::Value>,
}

impl VertexConfig {
    /// Checks the values a server cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty listen address, a
    /// zero client timeout or an unknown logging level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.trim().is_empty() {
            return Err(ConfigError::invalid_value("server.listen", "must not be empty"));
        }
        if self.server.client_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.client_timeout_secs",
                "must be greater than zero",
            ));
        }
        self.log_level()?;
        Ok(())
    }

    /// Parses the configured logging level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unknown levels.
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.server
            .logging_level
            .parse()
            .map_err(|e: vertex_telemetry::TelemetryError| {
                ConfigError::invalid_value("server.logging_level", e.to_string())
            })
    }

    /// Derives the logging setup from the server section.
    ///
    /// Insecure development servers log human-readable output, everything
    /// else logs JSON.
    ///
    /// # Errors
    ///
    /// Same as [`VertexConfig::log_level`].
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let base = if self.server.allow_insecure {
            LogConfig::development()
        } else {
            LogConfig::production()
        };
        Ok(base.with_level(self.log_level()?))
    }

    /// Deserializes the section of API `name` into `T`.
    ///
    /// Returns `Ok(None)` when there is no such section.
    ///
    /// ```
    /// use serde::Deserialize;
    /// use vertex_config::ConfigLoader;
    ///
    /// #[derive(Deserialize)]
    /// struct Limits {
    ///     max_items: u32,
    /// }
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[apis.users]\nmax_items = 20\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// let limits: Limits = config.api_config("users").unwrap().unwrap();
    /// assert_eq!(limits.max_items, 20);
    /// assert!(config.api_config::<Limits>("orders").unwrap().is_none());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the section does not match `T`.
    pub fn api_config<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        let Some(section) = self.apis.get(name) else {
            tracing::debug!(api = name, "no config section for api");
            return Ok(None);
        };

        serde_json::from_value(section.clone())
            .map(Some)
            .map_err(|e| ConfigError::invalid_value(format!("apis.{name}"), e.to_string()))
    }

    /// Logs a warning for every API section not in `registered`.
    pub fn warn_unregistered<'a, I>(&self, registered: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let registered: Vec<&str> = registered.into_iter().collect();
        for name in self.apis.keys() {
            if !registered.contains(&name.as_str()) {
                tracing::warn!(api = %name, "config section not registered with server");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VertexConfig::default();
        config.validate().unwrap();
        assert_eq!(config.log_level().unwrap(), LogLevel::Info);
        assert!(config.log_config().unwrap().json_format);
    }

    #[test]
    fn test_validate_rejects_empty_listen() {
        let mut config = VertexConfig::default();
        config.server.listen = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = VertexConfig::default();
        config.server.client_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.client_timeout_secs"));
    }

    #[test]
    fn test_critical_maps_to_error() {
        let mut config = VertexConfig::default();
        config.server.logging_level = "CRITICAL".to_string();
        config.server.allow_insecure = true;

        let log = config.log_config().unwrap();
        assert_eq!(log.level, "error");
        assert!(!log.json_format);
    }

    #[test]
    fn test_unknown_level() {
        let mut config = VertexConfig::default();
        config.server.logging_level = "LOUD".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_config_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            count: u32,
        }

        let mut config = VertexConfig::default();
        config
            .apis
            .insert("users".to_string(), serde_json::json!({ "count": "many" }));
        let err = config.api_config::<Strict>("users").unwrap_err();
        assert!(err.to_string().contains("apis.users"));
    }
}
