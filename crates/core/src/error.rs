//! Error types for docqa.
//!
//! A single error enum covers every failure the query pipeline can hit:
//! configuration, I/O, the two external providers (vector search and
//! completion), prompt templates and serialization.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`. The query
/// orchestrator is the only place that turns an error into user-facing text.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential, invalid setting or unreadable config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vector search or embedding provider failures
    #[error("Search failed: {0}")]
    Search(String),

    /// Completion provider failures (network, auth, quota, malformed payload)
    #[error("Completion failed: {0}")]
    Completion(String),

    /// Prompt template loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error came from one of the external providers.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, AppError::Search(_) | AppError::Completion(_))
    }

    /// Process exit code for this error class.
    ///
    /// `1` for provider failures, `2` for configuration problems and `3`
    /// for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Search(_) | AppError::Completion(_) => 1,
            AppError::Config(_) => 2,
            _ => 3,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
