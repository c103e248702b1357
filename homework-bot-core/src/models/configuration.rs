//! Configuration data structures

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default homework status endpoint
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
/// Seconds between polling iterations
pub const DEFAULT_RETRY_SECONDS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "homework_bot.log";

/// Logging level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "debug")]
    #[default]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Main configuration structure. Secrets are not part of it; see `Credentials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Homework status endpoint URL
    pub endpoint: String,
    /// Seconds to sleep between polling iterations
    pub retry_seconds: u64,
    /// Timeout for a single API request
    pub request_timeout_seconds: u64,
    /// Telegram Bot API base URL
    pub telegram_api_base: String,
    /// Logging verbosity level
    pub log_level: LogLevel,
    /// Also append log lines to `log_file`
    pub log_to_file: bool,
    /// Append-only log file
    pub log_file: PathBuf,
    /// Watermark state file (None = reset to now minus one interval on every start)
    pub state_file: Option<PathBuf>,
    /// Skip re-sending a failure notification identical to the previous one
    pub suppress_repeated_errors: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_seconds: DEFAULT_RETRY_SECONDS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            log_level: LogLevel::Debug,
            log_to_file: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            state_file: None,
            suppress_repeated_errors: true,
        }
    }
}

impl Configuration {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Configuration::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_dir = dirs::config_dir().ok_or("Could not determine config directory")?;
        Ok(config_dir.join("homework-bot").join("config.toml"))
    }

    /// Log file to append to, or None when logging to the console only
    pub fn log_file_path(&self) -> Option<&Path> {
        self.log_to_file.then_some(self.log_file.as_path())
    }

    pub fn retry_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retry_seconds)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_http_url(&self.endpoint) {
            errors.push(format!("endpoint {}", e));
        }
        if let Err(e) = validate_http_url(&self.telegram_api_base) {
            errors.push(format!("telegram_api_base {}", e));
        }

        if self.retry_seconds == 0 || self.retry_seconds > 86_400 {
            errors.push("retry_seconds must be between 1 and 86400".to_string());
        }

        if self.request_timeout_seconds == 0 || self.request_timeout_seconds > 300 {
            errors.push("request_timeout_seconds must be between 1 and 300".to_string());
        }

        if self.log_to_file && self.log_file.as_os_str().is_empty() {
            errors.push("log_file must not be empty when log_to_file is enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_http_url(value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("is not a valid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("must use http or https (got {})", other)),
    }
}
