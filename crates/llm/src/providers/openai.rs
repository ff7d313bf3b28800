//! OpenAI chat-completions provider.
//!
//! Talks to `POST {endpoint}/chat/completions` with bearer authentication.
//! Any OpenAI-compatible gateway works by pointing `endpoint` at it.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Longest slice of an error body carried into error messages.
const MAX_ERROR_SNIPPET: usize = 300;

/// Request body for `/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body for `/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    /// Base URL for the API, without trailing slash
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_OPENAI_URL, api_key)
    }

    /// Create a client for a custom base URL (e.g., a gateway or a mock server).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert an LlmRequest to the OpenAI wire format.
    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    /// Convert the OpenAI response to an LlmResponse.
    fn convert_response(
        &self,
        request: &LlmRequest,
        response: ChatCompletionResponse,
    ) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Completion(
                    "Malformed response from OpenAI: no message content in choices".to_string(),
                )
            })?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let started = Instant::now();
        let url = self.chat_url();

        tracing::info!(model = %request.model, "Sending completion request to OpenAI");
        tracing::debug!(
            prompt_len = request.prompt.len(),
            max_tokens = ?request.max_tokens,
            temperature = ?request.temperature,
            "POST {}",
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let snippet = make_snippet(&error_text);

            tracing::error!(
                %status,
                %snippet,
                latency_ms = started.elapsed().as_millis() as u64,
                "OpenAI chat completion returned non-success status"
            );

            return Err(AppError::Completion(format!(
                "OpenAI API error ({}): {}",
                status, snippet
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Failed to parse OpenAI response: {}", e)))?;

        let llm_response = self.convert_response(request, body)?;

        tracing::info!(
            latency_ms = started.elapsed().as_millis() as u64,
            "Received completion from OpenAI"
        );
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            llm_response.usage.prompt_tokens,
            llm_response.usage.completion_tokens,
            llm_response.usage.total_tokens
        );

        Ok(llm_response)
    }
}

/// Single-line, length-capped excerpt of an error body.
pub(crate) fn make_snippet(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_ERROR_SNIPPET {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_ERROR_SNIPPET).collect();
        format!("{}...", cut)
    }
}
