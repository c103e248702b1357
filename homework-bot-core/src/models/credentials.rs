//! Secrets read from the process environment

use crate::error::ConfigError;
use std::fmt;
use std::path::Path;

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// API token, bot token and destination chat. All three are non-empty once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    /// Load a dotenv file (if present) and read credentials from the environment.
    /// Variables already set in the environment take precedence over the file.
    pub fn from_env(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        match env_file {
            Some(path) => {
                if let Err(e) = dotenvy::from_path(path) {
                    tracing::debug!(path = %path.display(), error = %e, "env file not loaded");
                }
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup. Empty or blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let practicum_token = read(PRACTICUM_TOKEN_VAR);
        let telegram_token = read(TELEGRAM_TOKEN_VAR);
        let telegram_chat_id = read(TELEGRAM_CHAT_ID_VAR);

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        })
    }
}

/// Check that every required credential is present, logging at critical severity otherwise.
pub fn check_tokens(env_file: Option<&Path>) -> Result<Credentials, ConfigError> {
    Credentials::from_env(env_file).inspect_err(|e| {
        tracing::error!(severity = "critical", error = %e, "Required credentials are missing");
    })
}
