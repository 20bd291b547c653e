use crate::config::LlmConfig;
use crate::types::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Single-turn chat request: a system directive plus one user prompt.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Adapter default when `None`
    pub temperature: Option<f32>,
    /// Adapter default when `None`
    pub max_tokens: Option<u32>,
}

/// Trait for LLM adapters that answer a single chat turn with free text
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Get the name of this LLM adapter
    fn adapter_name(&self) -> String;

    /// Send the request and return the model's raw text answer.
    /// Transport and API failures are `HarvestError::Filter`.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// OpenAI-compatible chat completions adapter
pub struct OpenAiAdapter {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: Client,
}

impl OpenAiAdapter {
    /// Fails with `HarvestError::Filter` when the capability cannot be used at all.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(HarvestError::filter("Language model unavailable: no API key configured"));
        }
        if config.model.trim().is_empty() {
            return Err(HarvestError::filter("Language model unavailable: no model configured"));
        }

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::filter_with("LLM HTTP client could not be created", e))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
            client,
        })
    }
}

impl OpenAiAdapter {
    async fn exchange(&self, body: &OpenAiRequest<'_>) -> Result<OpenAiResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| HarvestError::filter_with("LLM HTTP request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::filter_with(
                format!("LLM API error {}", status),
                crate::utils::text::prefix_chars(body.trim(), 300).to_string(),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| HarvestError::filter_with("Failed to parse LLM response", e))
    }
}

#[async_trait]
impl LlmAdapter for OpenAiAdapter {
    fn adapter_name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = OpenAiRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: request.temperature.unwrap_or(self.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
        };

        // The deadline covers the body read as well as the send
        let parsed = tokio::time::timeout(self.timeout, self.exchange(&body))
            .await
            .map_err(|e| HarvestError::filter_with("LLM request timed out", e))??;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HarvestError::filter("LLM response has no choices"))?;

        let answer = choice.message.content.unwrap_or_default();
        debug!("LLM answered {:?}", answer);
        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
