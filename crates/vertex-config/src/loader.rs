//! Layered configuration loading.
//!
//! Layers are merged in the order they are added: defaults, then each file
//! or string, then environment variables. Tables merge key by key, so a file
//! only needs the values it changes.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{ConfigError, VertexConfig};

/// Loads a [`VertexConfig`] from layered sources.
///
/// ```no_run
/// use vertex_config::ConfigLoader;
///
/// # fn main() -> Result<(), vertex_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("vertex.toml")?
///     .with_env_prefix("VERTEX")
///     .load()?;
///
/// println!("listening on {}", config.server.listen);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    merged: Value,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            merged: defaults(),
            env_prefix: None,
        }
    }

    /// Discards every layer added so far and starts from the defaults.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.merged = defaults();
        self
    }

    /// Merges a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, has an unknown
    /// extension or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        tracing::debug!(path = %path.display(), "loading configuration file");
        self.with_string(&content, &format)
    }

    /// Merges a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::with_file`] for existing files.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges configuration text in `toml` or `json` format.
    ///
    /// ```
    /// use vertex_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nlisten = \"127.0.0.1:3000\"\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.listen, "127.0.0.1:3000");
    /// assert_eq!(config.server.client_timeout_secs, 60);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on malformed text, unknown fields or an unknown format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = match format.to_lowercase().as_str() {
            "toml" => {
                let _: VertexConfig = toml::from_str(content)?;
                serde_json::to_value(toml::from_str::<toml::Table>(content)?)?
            }
            "json" => {
                let layer: Value = serde_json::from_str(content)?;
                let _: VertexConfig = serde_json::from_value(layer.clone())?;
                layer
            }
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        merge(&mut self.merged, layer);
        Ok(self)
    }

    /// Applies `PREFIX__SECTION__KEY` environment variables on load.
    ///
    /// `VERTEX__SERVER__LISTEN=:8080` sets `server.listen`, and
    /// `VERTEX__APIS__USERS__MAX_ITEMS=20` sets `max_items` in the `users`
    /// API section. API names and keys are lowercased.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads variables from a `.env` file in the working directory, if any.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// Builds, normalises and validates the configuration.
    ///
    /// ```
    /// let config = vertex_config::ConfigLoader::new().load().unwrap();
    /// assert_eq!(config.server.listen, "0.0.0.0:9944");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if an environment override is malformed or validation fails.
    pub fn load(self) -> Result<VertexConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`ConfigLoader::load`] without validation.
    ///
    /// # Errors
    ///
    /// Fails if an environment override is malformed.
    pub fn load_unvalidated(mut self) -> Result<VertexConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&prefix, &key, &value)?;
            }
        }

        let mut config: VertexConfig = serde_json::from_value(self.merged)?;
        config.server.listen = config.server.listen_addr();
        Ok(config)
    }

    fn apply_env_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();

        let (section, field, parsed) = match parts.as_slice() {
            ["SERVER", "LISTEN"] => ("server", "listen".to_string(), Value::from(value)),
            ["SERVER", "CONSOLE_FILES_PATH"] => {
                ("server", "console_files_path".to_string(), Value::from(value))
            }
            ["SERVER", "LOGGING_LEVEL"] => ("server", "logging_level".to_string(), Value::from(value)),
            ["SERVER", "ALLOW_INSECURE"] => {
                let flag = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
                ("server", "allow_insecure".to_string(), Value::from(flag))
            }
            ["SERVER", field @ ("CLIENT_TIMEOUT_SECS" | "SHUTDOWN_TIMEOUT_SECS")] => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
                ("server", field.to_lowercase(), Value::from(secs))
            }
            ["AUTH", "USER"] => ("auth", "user".to_string(), Value::from(value)),
            ["AUTH", "PASSWORD"] => ("auth", "password".to_string(), Value::from(value)),
            ["APIS", api, field] => {
                let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
                let apis = table(&mut self.merged, "apis");
                table(apis, &api.to_lowercase())[field.to_lowercase().as_str()] = parsed;
                return Ok(());
            }
            _ => {
                tracing::debug!(var = key, "ignoring unknown configuration variable");
                return Ok(());
            }
        };

        table(&mut self.merged, section)[field.as_str()] = parsed;
        Ok(())
    }
}

fn defaults() -> Value {
    serde_json::to_value(VertexConfig::default()).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Returns the table under `key`, replacing any non-table value.
fn table<'a>(value: &'a mut Value, key: &str) -> &'a mut Value {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let entry = &mut value[key];
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry
}

/// Deep-merges `layer` into `base`. Tables merge, everything else replaces.
fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9944");
        assert!(!config.server.allow_insecure);
        assert_eq!(config.server.console_files_path, "../console");
        assert_eq!(config.server.logging_level, "INFO");
        assert_eq!(config.server.client_timeout_secs, 60);
    }

    #[test]
    fn test_layers_merge_in_order() {
        let config = ConfigLoader::new()
            .with_string("[server]\nlisten = \":8000\"\nallow_insecure = true\n", "toml")
            .unwrap()
            .with_string(r#"{"server": {"listen": ":9000"}, "apis": {"users": {"page": 10}}}"#, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert!(config.server.allow_insecure);
        assert_eq!(config.apis["users"]["page"], 10);
    }

    #[test]
    fn test_with_defaults_resets() {
        let config = ConfigLoader::new()
            .with_string("[server]\nallow_insecure = true\n", "toml")
            .unwrap()
            .with_defaults()
            .load()
            .unwrap();
        assert!(!config.server.allow_insecure);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"0.0.0.0:1\"\n", "toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));

        let err = ConfigLoader::new()
            .with_string(r#"{"telemetry": {}}"#, "json")
            .unwrap_err();
        assert!(matches!(err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let err = ConfigLoader::new().with_string("server:", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn test_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vertex.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nlogging_level = \"DEBUG\"\n[auth]\nuser = \"ops\"").unwrap();

        let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
        assert_eq!(config.server.logging_level, "DEBUG");
        assert_eq!(config.auth.user, "ops");
        assert_eq!(config.auth.password, "xetrev");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new().with_file("/nonexistent/vertex.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/vertex.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9944");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("VTXLOADERA__SERVER__LISTEN", "127.0.0.1:7000");
        env::set_var("VTXLOADERA__SERVER__ALLOW_INSECURE", "yes");
        env::set_var("VTXLOADERA__SERVER__CLIENT_TIMEOUT_SECS", "5");
        env::set_var("VTXLOADERA__APIS__USERS__MAX_ITEMS", "20");
        env::set_var("VTXLOADERA__UNKNOWN", "x");

        let config = ConfigLoader::new()
            .with_env_prefix("vtxloadera")
            .load()
            .unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:7000");
        assert!(config.server.allow_insecure);
        assert_eq!(config.server.client_timeout_secs, 5);
        assert_eq!(config.apis["users"]["max_items"], 20);
    }

    #[test]
    fn test_env_parse_error() {
        env::set_var("VTXLOADERB__SERVER__CLIENT_TIMEOUT_SECS", "soon");
        let err = ConfigLoader::new()
            .with_env_prefix("VTXLOADERB")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_validation_on_load() {
        let err = ConfigLoader::new()
            .with_string("[server]\nclient_timeout_secs = 0\n", "toml")
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let config = ConfigLoader::new()
            .with_string("[server]\nclient_timeout_secs = 0\n", "toml")
            .unwrap()
            .load_unvalidated()
            .unwrap();
        assert_eq!(config.server.client_timeout_secs, 0);
    }

    #[test]
    fn test_merge_replaces_scalars() {
        let mut base = serde_json::json!({ "a": { "b": 1, "c": 2 }, "d": [1] });
        merge(&mut base, serde_json::json!({ "a": { "b": 3 }, "d": [2, 3] }));
        assert_eq!(base, serde_json::json!({ "a": { "b": 3, "c": 2 }, "d": [2, 3] }));
    }
}
