//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::display::{DisplaySettings, DEFAULT_GAIN, POLL_INTERVAL_MS, WARNING_THRESHOLD};
use crate::messages::Locale;
use crate::model::DEFAULT_API_BASE;
use crate::poll::PollConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub poll: PollSettings,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Poll loop and chart derivation
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    #[serde(default = "default_threshold")]
    pub warning_threshold: f64,

    #[serde(default = "default_gain")]
    pub gain: f64,
}

fn default_interval() -> u64 {
    POLL_INTERVAL_MS
}

fn default_threshold() -> f64 {
    WARNING_THRESHOLD
}

fn default_gain() -> f64 {
    DEFAULT_GAIN
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            warning_threshold: default_threshold(),
            gain: default_gain(),
        }
    }
}

impl PollSettings {
    pub fn display(&self) -> DisplaySettings {
        DisplaySettings {
            warning_threshold: self.warning_threshold,
            gain: self.gain,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.interval_ms),
            display: self.display(),
        }
    }
}

/// Where the session identifier is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("ecg-monitor").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./ecg_session.json"))
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
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

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ecg-monitor").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("ECG_API_URL") {
            self.api.base_url = url;
        }
        if let Some(interval) = var("ECG_POLL_INTERVAL_MS") {
            match interval.parse() {
                Ok(ms) => self.poll.interval_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid ECG_POLL_INTERVAL_MS: {}", interval),
            }
        }
        if let Some(locale) = var("ECG_LOCALE") {
            match locale.parse() {
                Ok(locale) => self.ui.locale = locale,
                Err(e) => tracing::warn!("Ignoring ECG_LOCALE: {}", e),
            }
        }
        if let Some(level) = var("ECG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ECG_LOG_FORMAT") {
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
    r#"# ECG Monitor Configuration
#
# Environment variables override these settings:
# - ECG_API_URL
# - ECG_POLL_INTERVAL_MS
# - ECG_LOCALE
# - ECG_LOG_LEVEL
# - ECG_LOG_FORMAT

[api]
# Backend base URL
base_url = "http://localhost:8000"

[poll]
# Delay between fetches (ms)
interval_ms = 5000

# Signal value above which the warning is shown
warning_threshold = 1.3

# Signal gain applied before display (1.0 = unchanged)
gain = 1.0

[session]
# File holding the logged-in user id
# path = "~/.local/share/ecg-monitor/session.json"

[ui]
# Message language: ru or en
locale = "ru"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
