//! docqa CLI
//!
//! Main entry point for the docqa command-line tool.
//! Answers staff questions from an indexed document collection.

mod commands;

use clap::Parser;
use commands::AskCommand;
use docqa_core::config::{AppConfig, ConfigOverrides};
use docqa_core::{logging, AppError, AppResult};
use docqa_knowledge::QueryOutcome;
use std::path::PathBuf;
use std::process::ExitCode;

/// docqa - grounded answers from your document index
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Grounded answers from your document index", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    ask: AskCommand,

    /// Path to config file
    #[arg(short, long, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Path to the vector index
    #[arg(long)]
    index: Option<PathBuf>,

    /// Minimum relevance score for a passage to be used
    #[arg(long)]
    threshold: Option<f32>,

    /// Number of passages to retrieve
    #[arg(long)]
    top_k: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            index_path: self.index.clone(),
            threshold: self.threshold,
            top_k: self.top_k,
            log_level: self.log_level.clone(),
            verbose: self.verbose,
            no_color: self.no_color,
        }
    }
}

/// Load, override, validate, then start logging.
fn configure(cli: &Cli) -> AppResult<AppConfig> {
    let config = AppConfig::load(cli.config.clone())?.with_overrides(cli.overrides());

    logging::init_logging(config.logging.level.as_deref(), config.logging.color)?;
    config.validate()?;

    tracing::info!("docqa starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Index: {:?}", config.index.path);

    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up OPENAI_API_KEY and friends from a local .env, if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let outcome = match configure(&cli) {
        Ok(config) => {
            let _span = tracing::info_span!("command", name = "ask").entered();
            cli.ask.execute(&config).await
        }
        Err(e) => QueryOutcome::Failed(as_config_error(e)),
    };

    match &outcome {
        QueryOutcome::Failed(e) => tracing::error!("Command failed: {}", e),
        _ => tracing::info!("Command completed successfully"),
    }

    println!("{}", cli.ask.render(&outcome));
    ExitCode::from(outcome.exit_code())
}

/// Startup failures are configuration problems whatever their origin.
fn as_config_error(err: AppError) -> AppError {
    match err {
        AppError::Config(_) => err,
        other => AppError::Config(other.to_string()),
    }
}
