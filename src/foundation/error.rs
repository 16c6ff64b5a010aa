/// Convenience result type used across the crate.
pub type FallResult<T> = Result<T, FallError>;

/// Top-level error type for textfall.
///
/// The choreography engine itself never surfaces errors for malformed timing values, capacity
/// overflow or no-op activations; those degrade locally. `FallError` covers the boundaries:
/// configuration and document loading, selector parsing and host-side node lookups.
#[derive(thiserror::Error, Debug)]
pub enum FallError {
    /// Input failed validation (selectors, config invariants).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be read.
    #[error("config error: {0}")]
    Config(String),

    /// Document tree operation was invalid (unknown or detached node, wrong node kind).
    #[error("document error: {0}")]
    Document(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FallError {
    /// Build a [`FallError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FallError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FallError::Document`].
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Build a [`FallError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
