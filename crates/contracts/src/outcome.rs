//! Per-query outcomes and the run summary
//!
//! Exactly one `QueryOutcome` exists per input `QueryBlob` after a run, and
//! `RunSummary::outcomes()[i]` always belongs to input position `i`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One hit in a search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

/// Decoded search response (ResultPayload)
///
/// Passed through untouched by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Server status block; shape varies between server versions
    #[serde(default)]
    pub status: serde_json::Value,
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    /// Server-side time in nanoseconds
    #[serde(default)]
    pub took: i64,
    #[serde(default)]
    pub max_score: f64,
}

/// Why a single call failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorDetail {
    /// Connection or request could not be completed
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Call exceeded its own timeout
    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Server answered with a non-success status
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not a valid search result
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Run was cancelled before this query completed
    #[error("cancelled before completion")]
    Cancelled,

    /// Unit of work terminated abnormally
    #[error("unit of work aborted: {message}")]
    Aborted { message: String },
}

impl ErrorDetail {
    /// Create transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Short label, used as a metric dimension
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::Cancelled => "cancelled",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Result of one call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(SearchResult),
    Failure(ErrorDetail),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Failure(e) => Some(e),
            Self::Success(_) => None,
        }
    }
}

impl From<Result<SearchResult, ErrorDetail>> for Outcome {
    fn from(result: Result<SearchResult, ErrorDetail>) -> Self {
        match result {
            Ok(r) => Self::Success(r),
            Err(e) => Self::Failure(e),
        }
    }
}

/// Outcome keyed by the originating input position
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub position: usize,
    pub outcome: Outcome,
    /// Wall time spent in the call; zero if never admitted
    pub latency: Duration,
}

impl QueryOutcome {
    /// Failure for a unit that never ran
    pub fn not_run(position: usize, error: ErrorDetail) -> Self {
        Self {
            position,
            outcome: Outcome::Failure(error),
            latency: Duration::ZERO,
        }
    }
}

/// Serializable form of a `QueryOutcome`, one entry of the results store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub position: usize,
    pub success: bool,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl From<&QueryOutcome> for OutcomeRecord {
    fn from(o: &QueryOutcome) -> Self {
        let latency_ms = o.latency.as_millis() as u64;
        match &o.outcome {
            Outcome::Success(r) => Self {
                position: o.position,
                success: true,
                latency_ms,
                result: Some(r.clone()),
                error: None,
            },
            Outcome::Failure(e) => Self {
                position: o.position,
                success: false,
                latency_ms,
                result: None,
                error: Some(e.clone()),
            },
        }
    }
}

/// Aggregate result of one dispatcher run. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunSummary {
    success_count: u64,
    failure_count: u64,
    outcomes: Vec<QueryOutcome>,
    elapsed: Duration,
}

impl RunSummary {
    pub fn new(
        success_count: u64,
        failure_count: u64,
        outcomes: Vec<QueryOutcome>,
        elapsed: Duration,
    ) -> Self {
        Self {
            success_count,
            failure_count,
            outcomes,
            elapsed,
        }
    }

    /// Summary of a run with no input
    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new(), Duration::ZERO)
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// Outcomes ordered by input position
    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Serializable records in position order
    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.outcomes.iter().map(OutcomeRecord::from).collect()
    }

    /// Queries per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.outcomes.len() as f64 / secs
        } else {
            0.0
        }
    }
}
