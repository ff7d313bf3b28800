//! Configuration management for docqa.
//!
//! Configuration is assembled in layers, later layers winning:
//! - Built-in defaults (the reference deployment constants)
//! - A YAML config file (`--config`, `DOCQA_CONFIG`, or `./docqa.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The provider API key is only ever read from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::WeekdayLanguage;
use crate::error::{AppError, AppResult};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "docqa.yaml";

/// Providers the completion and embedding clients know how to talk to.
pub const KNOWN_PROVIDERS: [&str; 1] = ["openai"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Config file the settings were read from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Provider for completions and embeddings (e.g., "openai")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Base URL of the provider API
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// API key resolved from `api_key_env`
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    pub completion: CompletionConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub prompt: PromptConfig,
    pub clock: ClockConfig,
    pub logging: LoggingConfig,
}

/// Fixed parameters for every completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Embedding model used to vectorise the query. Must match the model the
/// index was built with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    pub model: String,
}

/// Location and layout of the pre-built vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    /// Directory of the vector database
    pub path: PathBuf,

    /// Table holding the passages
    pub table: String,

    /// Column with the passage text
    pub text_column: String,

    /// Column with the passage embedding
    pub vector_column: String,

    /// Optional column with a JSON object of extra metadata
    pub metadata_column: String,
}

/// Retrieval policy: how many candidates to fetch and how relevant they must be.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub threshold: f32,

    /// Metadata key holding a passage's source identifier
    pub source_key: String,
}

/// Prompt template selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    /// YAML prompt definition replacing the built-in template
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockConfig {
    pub weekday_language: WeekdayLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log filter (e.g., "info", "docqa_knowledge=debug")
    pub level: Option<String>,

    /// Colored log output
    pub color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            verbose: false,
            completion: CompletionConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
            prompt: PromptConfig::default(),
            clock: ClockConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.2,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chroma"),
            table: "chunks".to_string(),
            text_column: "text".to_string(),
            vector_column: "vector".to_string(),
            metadata_column: "metadata".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.7,
            source_key: "url".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            color: true,
        }
    }
}

/// Command-line overrides applied on top of file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub index_path: Option<PathBuf>,
    pub threshold: Option<f32>,
    pub top_k: Option<usize>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from the config file and the process environment.
    ///
    /// Environment variables:
    /// - `DOCQA_MODEL`: Chat model identifier
    /// - `DOCQA_ENDPOINT`: Provider base URL
    /// - `DOCQA_INDEX`: Vector index directory
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    /// - the variable named by `apiKeyEnv` (default `OPENAI_API_KEY`)
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Index: {:?}", config.index.path);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_file.is_some();
        let path = config_file.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                path
            )));
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML config file. Missing sections keep their defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config = Self::from_yaml_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.config_file = Some(path.to_path_buf());

        tracing::debug!("Loaded config file {:?}", path);
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> AppResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply environment overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("DOCQA_MODEL") {
            self.model = model;
        }

        if let Some(endpoint) = lookup("DOCQA_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Some(index) = lookup("DOCQA_INDEX") {
            self.index.path = PathBuf::from(index);
        }

        if let Some(language) = lookup("DOCQA_WEEKDAY_LANGUAGE") {
            self.clock.weekday_language = WeekdayLanguage::parse(&language).ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown DOCQA_WEEKDAY_LANGUAGE: {}. Supported: english, danish",
                    language
                ))
            })?;
        }

        if self.logging.level.is_none() {
            self.logging.level = lookup("RUST_LOG");
        }

        if lookup("NO_COLOR").is_some() {
            self.logging.color = false;
        }

        self.api_key = lookup(&self.api_key_env).filter(|key| !key.trim().is_empty());
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the file.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(path) = overrides.index_path {
            self.index.path = path;
        }

        if let Some(threshold) = overrides.threshold {
            self.retrieval.threshold = threshold;
        }

        if let Some(top_k) = overrides.top_k {
            self.retrieval.top_k = top_k;
        }

        if let Some(level) = overrides.log_level {
            self.logging.level = Some(level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.logging.color = false;
        }

        self
    }

    /// The provider API key, or a configuration error if it is not set.
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "{} environment variable is not set.",
                self.api_key_env
            ))
        })
    }

    /// Validate settings that would otherwise fail deep inside a query.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model identifier cannot be empty".to_string()));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("retrieval.topK must be at least 1".to_string()));
        }

        if !self.retrieval.threshold.is_finite() {
            return Err(AppError::Config(format!(
                "retrieval.threshold must be a finite number, got {}",
                self.retrieval.threshold
            )));
        }

        if self.retrieval.source_key.trim().is_empty() {
            return Err(AppError::Config(
                "retrieval.sourceKey cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(AppError::Config(format!(
                "completion.temperature must be between 0.0 and 2.0, got {}",
                self.completion.temperature
            )));
        }

        if self.completion.max_tokens == 0 {
            return Err(AppError::Config(
                "completion.maxTokens must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
