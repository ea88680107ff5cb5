//! # Client Configuration
//!
//! Configuration management for the generation task client.
//! Supports environment variables, config files, and programmatic overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::models::{GenerationParameters, PollPolicy, StatusProtocol, DEFAULT_PENDING_MARKER};

/// Client configuration for the generation service connection
///
/// # Examples
///
/// ```rust
/// use textgen_client::config::ClientConfig;
///
/// // Default configuration
/// let config = ClientConfig::default();
/// assert_eq!(config.service.base_url, "http://fastapi:80");
/// assert_eq!(config.polling.poll_interval_ms, 2000);
/// ```
///
/// ```rust,no_run
/// use textgen_client::config::ClientConfig;
///
/// // Load configuration from environment and config files
/// let config = ClientConfig::load().expect("Failed to load config");
///
/// println!("Generation service: {}", config.service.base_url);
/// println!("Poll interval: {}ms", config.polling.poll_interval_ms);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Generation service endpoint configuration
    pub service: ServiceConfig,
    /// Status polling configuration
    pub polling: PollingConfig,
    /// Default sampling parameters for `generate`
    pub generation: GenerationParameters,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Generation service endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL for the service (e.g., "<http://fastapi:80>")
    pub base_url: String,
    /// Path of the generate endpoint
    pub generate_path: String,
    /// Path prefix of the status endpoint; the task id is appended as a segment
    pub status_path: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Bearer token (if required)
    pub auth_token: Option<String>,
    /// Send sampling parameters alongside the prompt
    pub include_parameters: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://fastapi:80".to_string(),
            generate_path: "/generateText/".to_string(),
            status_path: "/task/".to_string(),
            timeout_ms: 30000,
            auth_token: None,
            include_parameters: false,
        }
    }
}

/// Which status protocol the service speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusProtocolKind {
    #[default]
    PendingMarker,
    Structured,
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Fixed delay between status queries in milliseconds
    pub poll_interval_ms: u64,
    /// Total wait budget in milliseconds
    pub wait_timeout_ms: u64,
    /// Substring marking an unfinished task (pending marker protocol only)
    pub pending_marker: String,
    pub protocol: StatusProtocolKind,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            wait_timeout_ms: 300_000,
            pending_marker: DEFAULT_PENDING_MARKER.to_string(),
            protocol: StatusProtocolKind::PendingMarker,
        }
    }
}

impl PollingConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.wait_timeout_ms),
        )
    }

    pub fn status_protocol(&self) -> StatusProtocol {
        match self.protocol {
            StatusProtocolKind::PendingMarker => StatusProtocol::PendingMarker {
                marker: self.pending_marker.clone(),
            },
            StatusProtocolKind::Structured => StatusProtocol::Structured,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON to the console instead of human-readable lines
    pub json: bool,
    /// Also write JSON logs under this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables and config file
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (./textgen-client.toml, ~/.textgen/config.toml, ...)
    /// 3. Default values
    pub fn load() -> ClientResult<Self> {
        Self::load_layered(Self::find_config_file().as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Layer an optional config file and env lookups over the defaults.
    /// A file that exists but cannot be read or parsed is an error.
    fn load_layered<F>(config_path: Option<&Path>, lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(lookup);
        config.validate()?;

        debug!(
            base_url = %config.service.base_url,
            poll_interval_ms = config.polling.poll_interval_ms,
            wait_timeout_ms = config.polling.wait_timeout_ms,
            has_auth_token = config.service.auth_token.is_some(),
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ClientError::config_error(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut possible_paths = vec![
            PathBuf::from("./textgen-client.toml"),
            PathBuf::from("./config/textgen-client.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            possible_paths.push(home.join(".textgen").join("config.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            possible_paths.push(config_dir.join("textgen").join("client.toml"));
        }

        possible_paths
            .into_iter()
            .find(|path| path.exists() && path.is_file())
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TEXTGEN_BASE_URL") {
            self.service.base_url = url;
        }
        if let Some(timeout_ms) = lookup("TEXTGEN_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.service.timeout_ms = timeout_ms;
        }
        if let Some(token) = lookup("TEXTGEN_AUTH_TOKEN") {
            self.service.auth_token = Some(token);
        }

        if let Some(interval) = lookup("TEXTGEN_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.polling.poll_interval_ms = interval;
        }
        if let Some(timeout) = lookup("TEXTGEN_WAIT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.polling.wait_timeout_ms = timeout;
        }
        if let Some(marker) = lookup("TEXTGEN_PENDING_MARKER") {
            self.polling.pending_marker = marker;
        }

        if let Some(level) = lookup("TEXTGEN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Reject configurations the client cannot run with
    pub fn validate(&self) -> ClientResult<()> {
        reqwest::Url::parse(&self.service.base_url).map_err(|e| {
            ClientError::config_error(format!(
                "Invalid base URL '{}': {}",
                self.service.base_url, e
            ))
        })?;

        if self.polling.poll_interval_ms == 0 {
            return Err(ClientError::config_error(
                "poll_interval_ms must be greater than zero",
            ));
        }
        if self.polling.protocol == StatusProtocolKind::PendingMarker
            && self.polling.pending_marker.is_empty()
        {
            return Err(ClientError::config_error(
                "pending_marker must not be empty",
            ));
        }

        self.generation
            .validate()
            .map_err(|e| ClientError::config_error(format!("Invalid generation defaults: {}", e)))
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::config_error(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config_error(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ClientError::config_error(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> ClientResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".textgen").join("config.toml"))
    }
}
