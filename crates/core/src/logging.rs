//! Logging infrastructure for docqa.
//!
//! Logs go to stderr so stdout carries only the answer (or the error line).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Filter used when neither the config nor `RUST_LOG` sets one.
///
/// A one-shot query should print nothing but its result unless asked to.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Initialize the tracing subscriber with stderr output.
///
/// # Arguments
/// * `log_level` - Optional filter override (e.g., "debug", "docqa_knowledge=trace")
/// * `color` - Emit ANSI colors
///
/// # Example
/// ```no_run
/// use docqa_core::logging::init_logging;
///
/// init_logging(None, true).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, color: bool) -> AppResult<()> {
    let env_filter = build_filter(log_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(color && std::env::var_os("NO_COLOR").is_none());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    let filter_str = log_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER);

    EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_default() {
        let filter = build_filter(None).unwrap();
        assert_eq!(filter.to_string(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_build_filter_blank_falls_back() {
        let filter = build_filter(Some("  ")).unwrap();
        assert_eq!(filter.to_string(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_build_filter_invalid() {
        let result = build_filter(Some("docqa=notalevel"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
