//! Query outcomes and their user-facing rendering.

use crate::types::SourceSet;
use docqa_core::AppError;
use serde::Serialize;

/// Printed when no passage clears the relevance threshold.
pub const NO_RESULT_MESSAGE: &str = "Unable to find matching results.";

/// An answer together with the sources it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedAnswer {
    /// Model output, passed through untouched
    pub answer: String,

    /// Unique sources of the passages in the prompt
    pub sources: SourceSet,

    /// Internal: highest relevance score among the passages used
    #[serde(skip_serializing)]
    pub max_score: f32,
}

impl std::fmt::Display for GroundedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Svar: {}\nKilder: {}", self.answer, self.sources)
    }
}

/// Terminal state of one query.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Passages were found and the model answered.
    Answered(GroundedAnswer),

    /// Nothing relevant enough was found; the model was not asked.
    NoResult,

    /// Search, prompt rendering or completion failed.
    Failed(AppError),
}

impl QueryOutcome {
    /// Process exit code for this outcome.
    ///
    /// Answers and empty results both count as success.
    pub fn exit_code(&self) -> u8 {
        match self {
            QueryOutcome::Answered(_) | QueryOutcome::NoResult => 0,
            QueryOutcome::Failed(err) => err.exit_code(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }

    /// Machine-readable form used by `--json`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryOutcome::Answered(grounded) => serde_json::json!({
                "status": "answered",
                "answer": grounded.answer,
                "sources": grounded.sources,
            }),
            QueryOutcome::NoResult => serde_json::json!({ "status": "no_result" }),
            QueryOutcome::Failed(err) => serde_json::json!({
                "status": "error",
                "message": err.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryOutcome::Answered(grounded) => write!(f, "{}", grounded),
            QueryOutcome::NoResult => f.write_str(NO_RESULT_MESSAGE),
            QueryOutcome::Failed(err) => write!(f, "An error occurred: {}", err),
        }
    }
}
