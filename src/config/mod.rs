//! Engine configuration.

/// JSON-facing engine configuration.
pub mod engine;
