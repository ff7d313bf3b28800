//! Ask command handler.
//!
//! Answers one question from the document index and prints the result.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::{QueryOrchestrator, QueryOutcome};

/// Ask a question about the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    ///
    /// Never fails: setup errors become [`QueryOutcome::Failed`] like any
    /// other error.
    pub async fn execute(&self, config: &AppConfig) -> QueryOutcome {
        tracing::info!("Executing ask command");

        let question = match self.question() {
            Ok(question) => question,
            Err(e) => return QueryOutcome::Failed(e),
        };
        tracing::debug!("Question: {}", question);

        let orchestrator = match QueryOrchestrator::from_config(config).await {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                tracing::error!("Failed to set up query pipeline: {}", e);
                return QueryOutcome::Failed(e);
            }
        };

        orchestrator.ask(question).await
    }

    /// The question with surrounding whitespace removed.
    fn question(&self) -> AppResult<&str> {
        let question = self.query.trim();
        if question.is_empty() {
            return Err(AppError::Config("Query text cannot be empty".to_string()));
        }
        Ok(question)
    }

    /// Format the outcome for stdout.
    pub fn render(&self, outcome: &QueryOutcome) -> String {
        if self.json {
            outcome.to_json().to_string()
        } else {
            outcome.to_string()
        }
    }
}
