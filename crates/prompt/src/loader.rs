//! Loading prompt definitions from YAML.

use crate::types::PromptDefinition;
use docqa_core::{AppError, AppResult};
use std::path::Path;

/// The deployment's built-in definition, compiled into the binary.
const BUILTIN_ANSWER_PROMPT: &str = include_str!("../templates/answer.yml");

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use docqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("prompts/answer.yml"))?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!("Prompt file not found: {:?}", path)));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e)))?;

    let definition = parse_prompt(&contents)
        .map_err(|e| AppError::Prompt(format!("{:?}: {}", path, e)))?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// The built-in grounded-answer definition.
pub fn builtin_prompt() -> AppResult<PromptDefinition> {
    parse_prompt(BUILTIN_ANSWER_PROMPT)
}

/// Load `path` if given, otherwise fall back to the built-in definition.
pub fn resolve_prompt(path: Option<&Path>) -> AppResult<PromptDefinition> {
    match path {
        Some(path) => load_prompt(path),
        None => builtin_prompt(),
    }
}

fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate the required fields of a prompt definition.
///
/// Placeholder checks happen when the template is compiled by the builder.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Simple x.y check
    let well_formed = def
        .api_version
        .split_once('.')
        .map(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false);

    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
