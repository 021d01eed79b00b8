//! Hosted text-generation clients.
//!
//! Implements the core [`Generator`] trait over OpenAI-compatible
//! `POST {base_url}/chat/completions` endpoints. Mistral (the default) and
//! OpenAI differ only in base URL, default model, and key variable; see
//! [`GenerationConfig`].
//!
//! # Request
//!
//! - Bearer token read from the configured environment variable.
//! - One user-role message carrying the prompt.
//! - Fixed decoding parameters: [`TEMPERATURE`], [`MAX_TOKENS`].
//!
//! # Failure handling
//!
//! No retries at this layer. A non-success status logs the response body
//! and fails with [`ServiceError::Status`]; transport errors (including
//! the configured timeout) fail with [`ServiceError::Transport`]. An empty
//! completion is an error, never an empty plan.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use study_coach_core::error::ServiceError;
use study_coach_core::generation::{DisabledGenerator, Generator};

use crate::config::GenerationConfig;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.7;

/// Upper bound on generated tokens per request.
pub const MAX_TOKENS: u32 = 2048;

/// Build the generator selected by `config.provider`.
///
/// # Errors
///
/// Fails if the provider is enabled but its API key variable is unset, or
/// the HTTP client cannot be built.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match config.provider.as_str() {
        "disabled" => Arc::new(DisabledGenerator),
        "mistral" | "openai" => Arc::new(ChatCompletionsClient::new(config)?),
        other => bail!("Unknown generation provider: {}", other),
    };
    Ok(generator)
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    /// Create a client, reading the API key from the environment variable
    /// named by [`GenerationConfig::api_key_env`].
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let var = config.api_key_env();
        let api_key = match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("{} environment variable not set", var),
        };
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url()),
            model: config.model_name().to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Generator for ChatCompletionsClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ApiMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(%status, body = %text, model = %self.model, "generation API error");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ServiceError::EmptyCompletion)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}
