//! Bot backend abstraction
//!
//! The bot answers a single user message. The only provider is a local
//! Ollama server; `LoggingService` wraps it with request logging.

mod error;
mod ollama;

pub use error::{BotError, BotErrorKind};
pub use ollama::{OllamaConfig, OllamaService};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for bot providers
#[async_trait]
pub trait BotService: Send + Sync {
    /// Answer one user message
    async fn reply(&self, prompt: &str) -> Result<String, BotError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for bot services
pub struct LoggingService {
    inner: Arc<dyn BotService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn BotService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl BotService for LoggingService {
    async fn reply(&self, prompt: &str) -> Result<String, BotError> {
        let start = std::time::Instant::now();
        let result = self.inner.reply(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    prompt_chars = prompt.chars().count(),
                    reply_chars = reply.chars().count(),
                    "Bot reply completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Bot reply failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
