//! Client configuration

use crate::sentiment::DEFAULT_HISTORY_LIMIT;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Where the session credential comes from
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    Static(String),
    File(PathBuf),
    None,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(<redacted>)"),
            TokenSource::File(path) => f.debug_tuple("File").field(path).finish(),
            TokenSource::None => f.write_str("None"),
        }
    }
}

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: TokenSource,
    /// Per-request transport timeout; unset means wait indefinitely
    pub http_timeout: Option<Duration>,
    pub history_limit: u32,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // A static token wins over a token file
        let token = match (non_empty("SENTIMENT_TOKEN"), non_empty("SENTIMENT_TOKEN_FILE")) {
            (Some(token), _) => TokenSource::Static(token),
            (None, Some(path)) => TokenSource::File(PathBuf::from(path)),
            (None, None) => TokenSource::None,
        };

        let http_timeout = non_empty("SENTIMENT_HTTP_TIMEOUT_SECS")
            .map(|v| parse_positive("SENTIMENT_HTTP_TIMEOUT_SECS", &v))
            .transpose()?
            .map(|secs| Duration::from_secs(u64::from(secs)));

        let history_limit = non_empty("SENTIMENT_HISTORY_LIMIT")
            .map(|v| parse_positive("SENTIMENT_HISTORY_LIMIT", &v))
            .transpose()?
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        Ok(Self {
            api_url: non_empty("SENTIMENT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token,
            http_timeout,
            history_limit,
        })
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
