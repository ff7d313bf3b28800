//! Query embedding.
//!
//! The search adapter embeds each question with the same model the index
//! was built with before asking the vector store for neighbours.

pub mod openai;

pub use openai::OpenAiEmbeddings;

use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Generate the embedding for one text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider for the configured backend.
pub fn create_embedding_provider(
    provider: &str,
    endpoint: &str,
    api_key: Option<&str>,
    model: &str,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config("OpenAI embeddings require an API key".to_string())
                })?;
            Ok(Arc::new(OpenAiEmbeddings::with_base_url(endpoint, key, model)))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_provider() {
        let provider = create_embedding_provider(
            "OpenAI",
            "https://api.openai.com/v1",
            Some("sk-test"),
            "text-embedding-ada-002",
        )
        .unwrap();

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-ada-002");
    }

    #[test]
    fn test_create_requires_key() {
        let result =
            create_embedding_provider("openai", "https://api.openai.com/v1", Some(" "), "m");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_embedding_provider("gguf", "http://localhost", Some("k"), "m");
        let err = result.err().unwrap();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }
}
