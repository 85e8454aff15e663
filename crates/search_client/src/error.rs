//! Search client error types
//!
//! Only construction can fail here; per-call failures are `ErrorDetail`s.

use thiserror::Error;

/// Search client specific error
#[derive(Debug, Error)]
pub enum SearchClientError {
    /// Credentials cannot be encoded as a header
    #[error("invalid credentials for user '{username}'")]
    InvalidCredentials { username: String },

    /// HTTP client could not be built
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, SearchClientError>;
