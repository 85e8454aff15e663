//! # Search Client
//!
//! `RemoteCaller` implementations.
//!
//! - [`HttpSearchClient`]: basic-auth JSON queries against a search index,
//!   with its own per-call timeout and classified failures
//! - [`MockSearchClient`]: scripted latency/failures for tests and offline runs

mod error;
mod http;
mod mock;

pub use error::{Result, SearchClientError};
pub use http::{HttpSearchClient, HttpSearchConfig};
pub use mock::{mock_result, FailurePattern, LatencyProfile, MockConfig, MockSearchClient};
