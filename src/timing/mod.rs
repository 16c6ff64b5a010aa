//! Timing parameters read from external style variables.

/// Style-variable reader and resolved phase timing.
pub mod reader;
