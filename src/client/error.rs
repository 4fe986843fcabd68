//! Sentiment service error types

use thiserror::Error;

/// Service error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// The `error` field of the service's response body, when it sent one
    pub server_message: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub fn with_server_message(mut self, server_message: Option<String>) -> Self {
        self.server_message = server_message;
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// Classify a non-success response from its status and body
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let server_message = serde_json::from_str::<crate::sentiment::ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        let detail = server_message.as_deref().unwrap_or(body);
        let kind = match status.as_u16() {
            401 | 403 => ApiErrorKind::Auth,
            404 => ApiErrorKind::NotFound,
            400 | 413 | 422 => ApiErrorKind::InvalidRequest,
            500..=599 => ApiErrorKind::ServerError,
            _ => ApiErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP {status}: {detail}")).with_server_message(server_message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection failures and timeouts
    Network,
    /// Missing or rejected credential (401, 403)
    Auth,
    /// Unknown history entry (404)
    NotFound,
    /// Rejected input (400, 413, 422)
    InvalidRequest,
    /// Server error (5xx)
    ServerError,
    /// Success status with a body we could not read
    Decode,
    /// Unknown error
    Unknown,
}
