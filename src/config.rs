//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::{RetryPolicy, DEFAULT_BASE_URL};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for any path outside `/api`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Remote API discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Production root tried after the caller's base URL
    #[serde(default = "default_base_url")]
    pub default_base_url: String,

    /// Extra attempts per call for network errors, timeouts and 5xx
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Per-attempt timeout, unless the request overrides it
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Backoff unit; retry `n` waits `n * backoff_ms`
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_shift_hours")]
    pub default_shift_hours: f64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_retries() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    10_000 // 10 seconds
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_shift_hours() -> f64 {
    8.0
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_base_url: default_base_url(),
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
            backoff_ms: default_backoff_ms(),
            default_shift_hours: default_shift_hours(),
        }
    }
}

impl DiscoveryConfig {
    /// Retry policy for outbound calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            timeout: Duration::from_millis(self.timeout_ms.max(1)),
            base_delay: Duration::from_millis(self.backoff_ms),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn filter_directive(&self) -> String {
        format!("tally={},tower_http=info", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// A config file that exists but cannot be loaded is logged and
    /// skipped. Callers that must not start on defaults use
    /// [`Config::try_load_default`].
    pub fn load_default() -> Self {
        match Self::try_load_default() {
            Ok((config, Some(path))) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Ok((config, None)) => {
                tracing::info!("Using default config with environment overrides");
                config
            }
            Err(e) => {
                tracing::warn!("{}; using default config with environment overrides", e);
                Self::from_env()
            }
        }
    }

    /// Load the first config file found in the default locations.
    ///
    /// Returns the path it came from, or `None` when no file exists and
    /// the config is built from the environment alone.
    pub fn try_load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("tally").join("config.toml")),
            Some(PathBuf::from("/etc/tally/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::try_load_first(&config_paths)
    }

    fn try_load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides; plain PORT is honoured for PaaS deployments
        if let Some(host) = var("TALLY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("TALLY_API_PORT").or_else(|| var("PORT")) {
            if let Ok(p) = port.parse::<u16>() {
                self.api.port = p;
            }
        }
        if let Some(dir) = var("TALLY_STATIC_DIR") {
            self.api.static_dir = dir;
        }

        // Discovery overrides
        if let Some(url) = var("TALLY_DEFAULT_BASE_URL") {
            self.discovery.default_base_url = url;
        }
        if let Some(Ok(retries)) = var("TALLY_RETRIES").map(|v| v.parse::<u32>()) {
            self.discovery.retries = retries;
        }
        if let Some(Ok(ms)) = var("TALLY_TIMEOUT_MS").map(|v| v.parse::<u64>()) {
            self.discovery.timeout_ms = ms;
        }
        if let Some(Ok(ms)) = var("TALLY_BACKOFF_MS").map(|v| v.parse::<u64>()) {
            self.discovery.backoff_ms = ms;
        }

        // Logging overrides
        if let Some(level) = var("TALLY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TALLY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tally Configuration
#
# Environment variables override these settings:
# - TALLY_API_HOST
# - TALLY_API_PORT (or PORT)
# - TALLY_STATIC_DIR
# - TALLY_DEFAULT_BASE_URL
# - TALLY_RETRIES
# - TALLY_TIMEOUT_MS
# - TALLY_BACKOFF_MS
# - TALLY_LOG_LEVEL
# - TALLY_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3000

# Static assets served outside /api
static_dir = "public"

# Maximum JSON request body (bytes)
max_body_bytes = 1048576

[discovery]
# Production address tried after the caller's base URL
default_base_url = "https://api.jibble.io"

# Extra attempts for network errors, timeouts and 5xx responses
retries = 2

# Per-attempt timeout (ms); requests may override with timeoutMs
timeout_ms = 10000

# Linear backoff unit (ms): retry n waits n * backoff_ms
backoff_ms = 500

# Shift length used when a request gives none
default_shift_hours = 8.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
