//! Ollama chat provider

use super::{BotError, BotService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama2";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub host: String,
    pub model: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("CHATGE_OLLAMA_HOST").unwrap_or(defaults.host),
            model: std::env::var("CHATGE_OLLAMA_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("CHATGE_BOT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Ollama `/api/chat` service, non-streaming
pub struct OllamaService {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaService {
    pub fn new(config: &OllamaConfig) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BotError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", config.host.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        }
    }
}

#[async_trait]
impl BotService for OllamaService {
    async fn reply(&self, prompt: &str) -> Result<String, BotError> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BotError::timeout(format!("Ollama request timed out: {e}"))
                } else {
                    BotError::network(format!("Unable to reach Ollama at {}: {e}", self.endpoint))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::from_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BotError::invalid_response(format!("Unexpected Ollama response: {e}")))?;

        tracing::debug!(chars = parsed.message.content.len(), "Ollama reply received");
        Ok(parsed.message.content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
