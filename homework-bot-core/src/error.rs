//! Error types for configuration, polling and delivery

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Parameters of a homework API request, carried by fetch errors for diagnostics.
///
/// The API token is never stored here; `Display` shows the header redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub from_date: i64,
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GET {} (Authorization: OAuth <redacted>, from_date={})",
            self.url, self.from_date
        )
    }
}

/// Fatal startup errors. The polling loop never begins when one of these occurs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Shape problems in an API response body
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("response is not a JSON object (got {found})")]
    NotAnObject { found: &'static str },

    #[error("expected key `{0}` is missing")]
    MissingKey(&'static str),

    #[error("key `{key}` is not a list (got {found})")]
    NotAList { key: &'static str, found: &'static str },

    #[error("key `{key}` is not a string")]
    NotAString { key: &'static str },

    #[error("response body is not valid JSON: {0}")]
    NotJson(String),
}

/// Recoverable errors raised by one polling iteration
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Could not reach the API server: {source}\n{request}")]
    Connectivity {
        request: RequestInfo,
        #[source]
        source: reqwest::Error,
    },

    #[error("API reported `{key}` - {value}\n{request}")]
    RemoteReported {
        key: String,
        value: String,
        request: RequestInfo,
    },

    #[error("Unexpected response status {status}\n{request}")]
    Protocol { status: u16, request: RequestInfo },

    #[error("Malformed API response: {0}")]
    MalformedResponse(#[from] ResponseError),

    #[error("Unexpected homework status `{0}`")]
    UnknownStatus(String),
}

impl PollError {
    /// Stable category name used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Connectivity { .. } => "connectivity",
            PollError::RemoteReported { .. } => "remote_reported",
            PollError::Protocol { .. } => "protocol",
            PollError::MalformedResponse(_) => "malformed_response",
            PollError::UnknownStatus(_) => "unknown_status",
        }
    }
}

/// Notification delivery failures. Never propagated past `providers::send_message`.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram API error {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// JSON type name for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
