//! Command handlers for the docqa CLI.

pub mod ask;

pub use ask::AskCommand;
