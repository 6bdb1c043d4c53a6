use thiserror::Error;

use crate::engine::handle::NetworkHandle;

/// Every way an engine call can fail.
///
/// All variants are returned synchronously to the immediate caller; the
/// engine never retries or swallows them.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Layer sizes rejected at construction (fewer than two, or a zero width).
    #[error("invalid topology {sizes:?}: {reason}")]
    InvalidTopology { sizes: Vec<usize>, reason: String },

    /// Operation on a handle that was deleted or never issued by this engine.
    #[error("invalid handle: {0}")]
    InvalidHandle(NetworkHandle),

    #[error("unknown hyperparameter: {0:?}")]
    UnknownParameter(String),

    #[error("unknown activation function: {0:?}")]
    UnknownActivation(String),

    /// Out-of-domain value for a hyperparameter or a non-finite sample value.
    #[error("invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: f64,
        reason: String,
    },

    /// Flat buffer length inconsistent with the declared count and widths.
    #[error("shape mismatch for {what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn invalid_value(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        EngineError::InvalidValue {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}
