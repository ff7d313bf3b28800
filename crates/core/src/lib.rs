//! docqa core library
//!
//! Foundational pieces shared by every docqa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - The clock used to stamp prompts with the current time

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock, WeekdayLanguage};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
