//! Prompt system for docqa.
//!
//! - YAML prompt definitions (with a built-in grounded-answer template)
//! - Handlebars rendering with the context, question and current time

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::PromptBuilder;
pub use loader::{builtin_prompt, load_prompt, resolve_prompt};
pub use types::{Prompt, PromptDefinition};
