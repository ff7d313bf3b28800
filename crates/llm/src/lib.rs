//! LLM integration crate for docqa.
//!
//! Provides a provider-agnostic chat-completion abstraction and the answer
//! service that sends grounded prompts to the model.
//!
//! # Providers
//! - **OpenAI** (and OpenAI-compatible gateways)
//!
//! # Example
//! ```no_run
//! use docqa_llm::{AnswerService, providers::OpenAiClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(OpenAiClient::new("sk-..."));
//! let service = AnswerService::new(client, "gpt-4o-mini", 4000, 0.2);
//! let answer = service.complete("Hello, world!").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use answer::AnswerService;
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
