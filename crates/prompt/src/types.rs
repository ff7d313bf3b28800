//! Prompt types for docqa.

use serde::{Deserialize, Serialize};

/// Placeholder for the aggregated passages.
pub const CONTEXT_VAR: &str = "context";

/// Placeholder for the user's question.
pub const QUESTION_VAR: &str = "question";

/// Placeholder for the `<Weekday> HH:MM` timestamp.
pub const CURRENT_TIME_VAR: &str = "current_time";

/// A prompt template definition loaded from YAML.
///
/// The template is Handlebars text referencing exactly `{{context}}`,
/// `{{question}}` and `{{current_time}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Free-form notes about the persona and rules encoded in the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// Values substituted into the template. Rendered as opaque text.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PromptVariables<'a> {
    pub context: &'a str,
    pub question: &'a str,
    pub current_time: &'a str,
}

/// A fully rendered prompt ready for the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Rendered prompt text
    pub text: String,

    /// Id of the definition it was rendered from
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,
}

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
