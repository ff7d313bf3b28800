//! LLM provider factory.
//!
//! Resolves a provider name from configuration into a concrete client.

use crate::client::LlmClient;
use crate::providers::openai::{OpenAiClient, DEFAULT_OPENAI_URL};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by every hosted provider)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config("OpenAI provider requires API key".to_string())
                })?;
            let base_url = endpoint.unwrap_or(DEFAULT_OPENAI_URL);
            tracing::debug!("Creating OpenAI client for {}", base_url);
            Ok(Arc::new(OpenAiClient::with_base_url(base_url, api_key)))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_client() {
        let client = create_client("openai", None, Some("sk-test")).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        assert!(create_client("OpenAI", Some("http://localhost:8080/v1"), Some("sk")).is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(err) => assert!(err.to_string().contains("OpenAI provider requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }

        assert!(create_client("openai", None, Some("  ")).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, Some("sk-test")) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
