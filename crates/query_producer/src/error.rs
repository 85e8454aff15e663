//! Query producer error types

use contracts::{ContractError, QUERY_SHAPE_COUNT};
use thiserror::Error;

/// Producer-specific errors
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Requested count cannot be split evenly across shapes
    #[error("query count {count} is not a multiple of {QUERY_SHAPE_COUNT}")]
    UnevenCount { count: usize },

    /// No samples to draw from
    #[error("sample pool is empty")]
    EmptySamples,

    /// Sample record is unusable
    #[error("sample {index} is invalid: {message}")]
    InvalidSample { index: usize, message: String },

    /// Repeat count below one
    #[error("iterations must be >= 1, got {0}")]
    InvalidIterations(usize),

    /// Sample file could not be read or parsed
    #[error("failed to load samples from '{path}': {message}")]
    SampleLoad { path: String, message: String },

    /// Query definition could not be serialized
    #[error("failed to serialize query {index}: {source}")]
    Serialize {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Store read/write error
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ProducerError {
    /// Create invalid sample error
    pub fn invalid_sample(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidSample {
            index,
            message: message.into(),
        }
    }

    /// Create sample load error
    pub fn sample_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SampleLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ProducerError>;
