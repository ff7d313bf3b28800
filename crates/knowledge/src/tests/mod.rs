//! Crate-level tests and shared fakes.
