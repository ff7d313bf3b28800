//! Prompt builder: renders the grounded-answer template.
//!
//! The template is compiled once; every query then renders it with the
//! context block, the question and the current time. Values are inserted as
//! plain text and never parsed as template syntax, so a question containing
//! `{{...}}` reaches the model verbatim.

use crate::loader::builtin_prompt;
use crate::types::{
    Prompt, PromptDefinition, PromptVariables, CONTEXT_VAR, CURRENT_TIME_VAR, QUESTION_VAR,
};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;

const TEMPLATE_NAME: &str = "prompt";

/// Compiled prompt template.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
    source_prompt_id: String,
}

impl PromptBuilder {
    /// Compile a definition's template.
    ///
    /// Fails if the template does not parse, references a variable other
    /// than the three placeholders, or leaves one of them out.
    pub fn new(definition: &PromptDefinition) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(TEMPLATE_NAME, &definition.template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        let builder = Self {
            registry,
            source_prompt_id: definition.id.clone(),
        };
        builder.check_placeholders()?;

        tracing::debug!("Compiled prompt template: {}", definition.id);
        Ok(builder)
    }

    /// Compile the built-in grounded-answer template.
    pub fn builtin() -> AppResult<Self> {
        Self::new(&builtin_prompt()?)
    }

    /// Id of the definition this builder renders.
    pub fn source_prompt_id(&self) -> &str {
        &self.source_prompt_id
    }

    /// Render the prompt for one query.
    pub fn build(&self, context: &str, question: &str, current_time: &str) -> AppResult<Prompt> {
        let text = self.render(&PromptVariables {
            context,
            question,
            current_time,
        })?;

        tracing::debug!(
            prompt_id = %self.source_prompt_id,
            prompt_len = text.len(),
            "Built prompt"
        );

        Ok(Prompt {
            text,
            source_prompt_id: self.source_prompt_id.clone(),
        })
    }

    fn render(&self, variables: &PromptVariables<'_>) -> AppResult<String> {
        self.registry
            .render(TEMPLATE_NAME, variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }

    /// Render with sentinel values and make sure each one shows up.
    fn check_placeholders(&self) -> AppResult<()> {
        const CONTEXT_SENTINEL: &str = "\u{1}docqa-context\u{1}";
        const QUESTION_SENTINEL: &str = "\u{1}docqa-question\u{1}";
        const TIME_SENTINEL: &str = "\u{1}docqa-time\u{1}";

        let rendered = self.render(&PromptVariables {
            context: CONTEXT_SENTINEL,
            question: QUESTION_SENTINEL,
            current_time: TIME_SENTINEL,
        })?;

        let missing: Vec<&str> = [
            (CONTEXT_VAR, CONTEXT_SENTINEL),
            (QUESTION_VAR, QUESTION_SENTINEL),
            (CURRENT_TIME_VAR, TIME_SENTINEL),
        ]
        .iter()
        .filter(|(_, sentinel)| !rendered.contains(sentinel))
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::Prompt(format!(
                "Template '{}' must reference {}",
                self.source_prompt_id,
                missing
                    .iter()
                    .map(|name| format!("{{{{{}}}}}", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder")
            .field("source_prompt_id", &self.source_prompt_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(template: &str) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            description: None,
            template: template.to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let builder =
            PromptBuilder::new(&definition("[{{current_time}}] {{context}} | {{question}}"))
                .unwrap();
        let prompt = builder
            .build("Kantinen åbner 11:00", "Hvornår åbner kantinen?", "Monday 10:30")
            .unwrap();

        assert_eq!(
            prompt.text,
            "[Monday 10:30] Kantinen åbner 11:00 | Hvornår åbner kantinen?"
        );
        assert_eq!(prompt.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_builtin_contains_inputs_verbatim() {
        let builder = PromptBuilder::builtin().unwrap();
        let context = "Parkering er gratis.\n\n---\n\nBesøgstid 14-20.";
        let question = "Hvornår er der besøgstid?";

        let prompt = builder.build(context, question, "tirsdag 13:37").unwrap();

        assert!(prompt.text.contains(context));
        assert!(prompt.text.contains(&format!("Spørgsmål: {}", question)));
        assert!(prompt.text.contains("Klokken er nu: tirsdag 13:37."));
        assert_eq!(prompt.source_prompt_id, "answer.grounded");
    }

    #[test]
    fn test_values_are_not_interpreted_as_template() {
        let builder = PromptBuilder::builtin().unwrap();
        let question = "What is {{current_time}} and {{#each x}}{{/each}}?";
        let context = "<b>{{question}}</b> & {{{context}}}";

        let prompt = builder.build(context, question, "Friday 09:00").unwrap();

        assert!(prompt.text.contains(question));
        assert!(prompt.text.contains(context));
    }

    #[test]
    fn test_no_html_escaping() {
        let builder = PromptBuilder::new(&definition("{{context}}{{question}}{{current_time}}"))
            .unwrap();
        let prompt = builder.build("a < b", "\"quoted\" & 'single'", "t").unwrap();
        assert_eq!(prompt.text, "a < b\"quoted\" & 'single't");
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let err = PromptBuilder::new(&definition("{{context}} {{question}}")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("{{current_time}}"));
        assert!(!message.contains("{{question}}"));
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let result = PromptBuilder::new(&definition(
            "{{context}} {{question}} {{current_time}} {{workspace}}",
        ));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_unparsable_template_rejected() {
        let result = PromptBuilder::new(&definition("{{#if context}} {{question}}"));
        assert!(result.is_err());
    }
}
