//! Bot backend error types

use thiserror::Error;

/// Bot error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BotError {
    pub kind: BotErrorKind,
    pub message: String,
}

impl BotError {
    pub fn new(kind: BotErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BotErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BotErrorKind::Timeout, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BotErrorKind::InvalidResponse, message)
    }

    /// Classify a non-success HTTP status from the model server
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => BotErrorKind::Auth,
            429 => BotErrorKind::RateLimit,
            500..=599 => BotErrorKind::ServerError,
            _ => BotErrorKind::InvalidRequest,
        };
        Self::new(kind, format!("Model server returned {status}: {}", body.trim()))
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotErrorKind {
    /// Connection failures - retryable
    Network,
    /// No answer in time - retryable
    Timeout,
    /// Rate limited (429) - retryable with backoff
    RateLimit,
    /// Server error (5xx) - retryable
    ServerError,
    /// Authentication failed (401, 403) - not retryable
    Auth,
    /// Bad request (4xx) - not retryable
    InvalidRequest,
    /// Body did not match the expected shape
    InvalidResponse,
}

impl BotErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ServerError
        )
    }
}
