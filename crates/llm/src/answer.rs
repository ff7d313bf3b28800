//! Answer service: one prompt in, one answer out.
//!
//! Wraps an [`LlmClient`] with the deployment's fixed completion parameters
//! and folds every provider failure into [`AppError::Completion`].

use crate::client::{LlmClient, LlmRequest};
use docqa_core::config::AppConfig;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Sends rendered prompts to the completion provider.
#[derive(Clone)]
pub struct AnswerService {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnswerService {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Build the service with the model and parameters from configuration.
    pub fn from_config(client: Arc<dyn LlmClient>, config: &AppConfig) -> Self {
        Self::new(
            client,
            config.model.clone(),
            config.completion.max_tokens,
            config.completion.temperature,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request an answer for the prompt.
    ///
    /// Exactly one provider call per invocation. The answer text is returned
    /// as-is; only its presence is checked.
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        let request = LlmRequest::new(prompt, &self.model)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            "Requesting answer"
        );

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(as_completion_error)?;

        if response.content.trim().is_empty() {
            return Err(AppError::Completion(
                "Malformed response: model returned an empty answer".to_string(),
            ));
        }

        Ok(response.content)
    }
}

fn as_completion_error(err: AppError) -> AppError {
    match err {
        AppError::Completion(message) => AppError::Completion(message),
        other => AppError::Completion(other.to_string()),
    }
}
