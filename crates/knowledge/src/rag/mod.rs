//! Grounded question answering.
//!
//! Search, filter, aggregate, build the prompt, ask the model, format.

pub mod ask;
pub mod types;

pub use ask::QueryOrchestrator;
pub use types::{GroundedAnswer, QueryOutcome, NO_RESULT_MESSAGE};
