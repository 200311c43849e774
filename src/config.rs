//! Configuration management for Routine Builder
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, RoutineError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variables consulted for the upstream credential, in order.
/// Later entries win.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["OPENAI_API_KEY", "ROUTINE_BUILDER_API_KEY"];

/// Main configuration structure for Routine Builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Relay server settings (upstream, credential, defaults, CORS)
    #[serde(default)]
    pub relay: RelayConfig,
    /// Chat client settings (relay endpoint, prompt)
    #[serde(default)]
    pub client: ClientConfig,
    /// Product catalog location
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Selection slot location
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Relay server configuration
///
/// The credential is held here and injected into upstream requests.
/// It is never serialized back out and never sent to clients.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Socket address the relay listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upstream chat-completion endpoint
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Bearer credential for the upstream API
    ///
    /// Prefer supplying this through `OPENAI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model used when the caller omits one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// `max_tokens` used when the caller omits it
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// `temperature` used when the caller omits it
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    /// Value of `Access-Control-Allow-Origin`
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    /// Upstream request timeout; `None` waits indefinitely
    #[serde(default)]
    pub upstream_timeout_seconds: Option<u64>,
}

// Hand-written so the credential never lands in logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind", &self.bind)
            .field("upstream_url", &self.upstream_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("default_temperature", &self.default_temperature)
            .field("allow_origin", &self.allow_origin)
            .field("upstream_timeout_seconds", &self.upstream_timeout_seconds)
            .finish()
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_upstream_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f64 {
    0.7
}

fn default_allow_origin() -> String {
    "*".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upstream_url: default_upstream_url(),
            api_key: None,
            default_model: default_model(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
            allow_origin: default_allow_origin(),
            upstream_timeout_seconds: None,
        }
    }
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the relay endpoint the chat client posts to
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Timeout for a single relay call (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Optional replacement for the built-in advisor system prompt
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Model requested from the relay; the relay default applies when unset
    #[serde(default)]
    pub model: Option<String>,

    /// `max_tokens` requested from the relay
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// `temperature` requested from the relay
    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8787/".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            request_timeout_seconds: default_request_timeout(),
            system_prompt: None,
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the static `{ "products": [...] }` file
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/products.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Selection storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database holding the selection slot.
    /// Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the storage directory, falling back to the platform data dir
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::Storage` when no data directory can be found
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let proj_dirs = ProjectDirs::from("com", "routine-builder", "routine-builder")
            .ok_or_else(|| RoutineError::Storage("Could not determine data directory".into()))?;

        Ok(proj_dirs.data_dir().join("selection.db"))
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RoutineError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RoutineError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        for var in CREDENTIAL_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    self.relay.api_key = Some(key);
                }
            }
        }

        if let Ok(bind) = std::env::var("ROUTINE_BUILDER_BIND") {
            self.relay.bind = bind;
        }

        if let Ok(url) = std::env::var("ROUTINE_BUILDER_UPSTREAM_URL") {
            self.relay.upstream_url = url;
        }

        if let Ok(model) = std::env::var("ROUTINE_BUILDER_DEFAULT_MODEL") {
            self.relay.default_model = model;
        }

        if let Ok(max_tokens) = std::env::var("ROUTINE_BUILDER_DEFAULT_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.relay.default_max_tokens = value;
            } else {
                tracing::warn!("Invalid ROUTINE_BUILDER_DEFAULT_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(temperature) = std::env::var("ROUTINE_BUILDER_DEFAULT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.relay.default_temperature = value;
            } else {
                tracing::warn!(
                    "Invalid ROUTINE_BUILDER_DEFAULT_TEMPERATURE: {}",
                    temperature
                );
            }
        }

        if let Ok(origin) = std::env::var("ROUTINE_BUILDER_ALLOW_ORIGIN") {
            self.relay.allow_origin = origin;
        }

        if let Ok(timeout) = std::env::var("ROUTINE_BUILDER_UPSTREAM_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.relay.upstream_timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid ROUTINE_BUILDER_UPSTREAM_TIMEOUT: {}", timeout);
            }
        }

        if let Ok(relay_url) = std::env::var("ROUTINE_BUILDER_RELAY_URL") {
            self.client.relay_url = relay_url;
        }

        if let Ok(catalog) = std::env::var("ROUTINE_BUILDER_CATALOG") {
            self.catalog.path = PathBuf::from(catalog);
        }

        if let Ok(storage) = std::env::var("ROUTINE_BUILDER_STORAGE") {
            self.storage.path = Some(PathBuf::from(storage));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(catalog) = &cli.catalog {
            self.catalog.path = catalog.clone();
        }

        if let Some(storage) = &cli.storage_path {
            self.storage.path = Some(storage.clone());
        }

        if let Some(relay_url) = &cli.relay_url {
            self.client.relay_url = relay_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all values are within acceptable ranges. Does not require a
    /// credential; see [`Config::validate_for_serve`].
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.relay.bind.parse::<SocketAddr>().map_err(|e| {
            RoutineError::Config(format!("Invalid relay.bind '{}': {}", self.relay.bind, e))
        })?;

        url::Url::parse(&self.relay.upstream_url).map_err(|e| {
            RoutineError::Config(format!(
                "Invalid relay.upstream_url '{}': {}",
                self.relay.upstream_url, e
            ))
        })?;

        url::Url::parse(&self.client.relay_url).map_err(|e| {
            RoutineError::Config(format!(
                "Invalid client.relay_url '{}': {}",
                self.client.relay_url, e
            ))
        })?;

        if self.relay.default_model.trim().is_empty() {
            return Err(
                RoutineError::Config("relay.default_model cannot be empty".to_string()).into(),
            );
        }

        if self.relay.default_max_tokens == 0 {
            return Err(RoutineError::Config(
                "relay.default_max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.relay.default_temperature) {
            return Err(RoutineError::Config(
                "relay.default_temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.relay.upstream_timeout_seconds == Some(0) {
            return Err(RoutineError::Config(
                "relay.upstream_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.max_tokens == Some(0) {
            return Err(RoutineError::Config(
                "client.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if let Some(temperature) = self.client.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(RoutineError::Config(
                    "client.temperature must be between 0.0 and 2.0".to_string(),
                )
                .into());
            }
        }

        if self.client.request_timeout_seconds == 0 {
            return Err(RoutineError::Config(
                "client.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Validate the configuration for running the relay server
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::MissingCredentials` if no upstream credential
    /// is configured, or any error from [`Config::validate`]
    pub fn validate_for_serve(&self) -> Result<()> {
        self.validate()?;

        match self.relay.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(RoutineError::MissingCredentials(format!(
                "set one of {} before starting the relay",
                CREDENTIAL_ENV_VARS.join(", ")
            ))
            .into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            client: ClientConfig::default(),
            catalog: CatalogConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in CREDENTIAL_ENV_VARS {
            std::env::remove_var(var);
        }
        for var in [
            "ROUTINE_BUILDER_BIND",
            "ROUTINE_BUILDER_UPSTREAM_URL",
            "ROUTINE_BUILDER_DEFAULT_MODEL",
            "ROUTINE_BUILDER_DEFAULT_MAX_TOKENS",
            "ROUTINE_BUILDER_DEFAULT_TEMPERATURE",
            "ROUTINE_BUILDER_ALLOW_ORIGIN",
            "ROUTINE_BUILDER_UPSTREAM_TIMEOUT",
            "ROUTINE_BUILDER_RELAY_URL",
            "ROUTINE_BUILDER_CATALOG",
            "ROUTINE_BUILDER_STORAGE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.relay.default_model, "gpt-4o");
        assert_eq!(config.relay.default_max_tokens, 500);
        assert_eq!(config.relay.default_temperature, 0.7);
        assert_eq!(config.relay.allow_origin, "*");
        assert!(config.relay.upstream_timeout_seconds.is_none());
        assert_eq!(
            config.relay.upstream_url,
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_bind() {
        let mut config = Config::default();
        config.relay.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_upstream_url() {
        let mut config = Config::default();
        config.relay.upstream_url = "::nope".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_max_tokens() {
        let mut config = Config::default();
        config.relay.default_max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature_out_of_range() {
        let mut config = Config::default();
        config.relay.default_temperature = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_for_serve_requires_credential() {
        let mut config = Config::default();
        assert!(config.validate_for_serve().is_err());

        config.relay.api_key = Some("   ".to_string());
        assert!(config.validate_for_serve().is_err());

        config.relay.api_key = Some("sk-test".to_string());
        assert!(config.validate_for_serve().is_ok());
    }

    #[test]
    fn test_relay_config_debug_redacts_credential() {
        let relay = RelayConfig {
            api_key: Some("sk-very-secret".to_string()),
            ..RelayConfig::default()
        };
        let rendered = format!("{:?}", relay);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_credential_not_serialized() {
        let mut config = Config::default();
        config.relay.api_key = Some("sk-very-secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-very-secret"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
relay:
  default_model: gpt-4o-mini
catalog:
  path: /srv/catalog.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.relay.default_model, "gpt-4o-mini");
        assert_eq!(config.relay.default_max_tokens, 500);
        assert_eq!(config.catalog.path, PathBuf::from("/srv/catalog.json"));
        assert_eq!(config.client.relay_url, "http://127.0.0.1:8787/");
    }

    #[test]
    fn test_client_request_overrides_parse_and_validate() {
        let yaml = r#"
client:
  model: gpt-4o-mini
  max_tokens: 800
  temperature: 0.5
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.client.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.client.max_tokens, Some(800));
        assert_eq!(config.client.temperature, Some(0.5));
        assert!(config.validate().is_ok());

        config.client.temperature = Some(3.0);
        assert!(config.validate().is_err());

        config.client.temperature = None;
        config.client.max_tokens = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let contents = std::fs::read_to_string("config/config.yaml")
            .expect("Failed to read example config/config.yaml");
        let config: Config =
            serde_yaml::from_str(&contents).expect("Failed to parse config/config.yaml");
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.path, PathBuf::from("data/products.json"));
    }

    #[test]
    fn test_storage_resolve_prefers_explicit_path() {
        let storage = StorageConfig {
            path: Some(PathBuf::from("/tmp/selection.db")),
        };
        assert_eq!(
            storage.resolve_path().unwrap(),
            PathBuf::from("/tmp/selection.db")
        );
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.relay.default_model, "gpt-4o");
        assert!(config.relay.api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file_values() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-from-env");
        std::env::set_var("ROUTINE_BUILDER_DEFAULT_MAX_TOKENS", "900");
        std::env::set_var("ROUTINE_BUILDER_DEFAULT_TEMPERATURE", "not-a-number");
        std::env::set_var("ROUTINE_BUILDER_UPSTREAM_TIMEOUT", "30");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.relay.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.relay.default_max_tokens, 900);
        assert_eq!(config.relay.default_temperature, 0.7);
        assert_eq!(config.relay.upstream_timeout_seconds, Some(30));
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win_over_env() {
        clear_env();
        std::env::set_var("ROUTINE_BUILDER_RELAY_URL", "http://env.example/");

        let cli = crate::cli::Cli {
            relay_url: Some("http://cli.example/".to_string()),
            storage_path: Some(PathBuf::from("/tmp/cli-selection.db")),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.client.relay_url, "http://cli.example/");
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/cli-selection.db"))
        );
    }
}
