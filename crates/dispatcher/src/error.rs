//! Dispatcher error types
//!
//! Only admission and sink setup fail here. A started run always completes
//! with a summary; per-query failures become `Outcome::Failure`.

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Admission limit below one
    #[error("concurrency limit must be >= 1, got {0}")]
    InvalidLimit(usize),

    /// Cancellation fired before the run started
    #[error("run cancelled before start")]
    AlreadyCancelled,

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatchError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
