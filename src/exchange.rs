//! Hypermedia exchanges with the chat server
//!
//! An exchange posts the form parameters to one of the fragment endpoints
//! and returns the HTML fragment to swap into the transcript.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Endpoint that renders the user's own message
pub const SHOW_MY_MESSAGE_PATH: &str = "/show-my-message";

/// Endpoint that renders the bot's reply
pub const BOT_RESPONSE_PATH: &str = "/get-bot-response";

/// Form parameters carried by both fragment endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormParams {
    pub message: String,
}

impl FormParams {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Exchange error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExchangeError {
    pub kind: ExchangeErrorKind,
    pub message: String,
}

impl ExchangeError {
    pub fn new(kind: ExchangeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ExchangeErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ExchangeErrorKind::Timeout, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = if status >= 500 {
            ExchangeErrorKind::ServerError
        } else {
            ExchangeErrorKind::Rejected
        };
        let body = body.trim();
        if body.is_empty() {
            Self::new(kind, format!("HTTP {status}"))
        } else {
            Self::new(kind, format!("HTTP {status}: {body}"))
        }
    }
}

/// Error classification for exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeErrorKind {
    /// Connection failures
    Network,
    /// No response within the exchange timeout
    Timeout,
    /// Server answered 5xx
    ServerError,
    /// Server answered 4xx
    Rejected,
}

/// reqwest-backed exchange client
///
/// Bodies are JSON encoded, matching htmx's `json-enc` extension.
#[derive(Clone)]
pub struct HttpExchangeClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExchangeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ExchangeError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `params` to `path` and return the fragment body
    pub async fn post_fragment(
        &self,
        path: &str,
        params: &FormParams,
    ) -> Result<String, ExchangeError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("HX-Request", "true")
            .json(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExchangeError::timeout(format!("{path} timed out: {e}"))
                } else {
                    ExchangeError::network(format!("{path} failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::network(format!("Failed to read {path} body: {e}")))?;

        if !status.is_success() {
            return Err(ExchangeError::from_status(status.as_u16(), &body));
        }

        Ok(body)
    }
}
