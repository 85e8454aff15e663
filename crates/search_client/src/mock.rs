//! Mock search client for testing
//!
//! Scripted latency and failures per position, plus a probe that records the
//! peak number of concurrent `call`s.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use contracts::{ErrorDetail, QueryBlob, RemoteCaller, SearchHit, SearchResult};
use tracing::trace;

/// Which positions fail
#[derive(Debug, Clone, Default)]
pub enum FailurePattern {
    #[default]
    Never,
    Always,
    /// Odd positions fail, even succeed
    OddPositions,
    Positions(HashSet<usize>),
}

impl FailurePattern {
    pub fn fails(&self, position: usize) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::OddPositions => position % 2 == 1,
            Self::Positions(set) => set.contains(&position),
        }
    }
}

/// How long each call takes
#[derive(Debug, Clone)]
pub enum LatencyProfile {
    Fixed(Duration),
    /// Earlier positions take longer, so completion order inverts input order
    Descending { step: Duration, total: usize },
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::Fixed(Duration::ZERO)
    }
}

impl LatencyProfile {
    pub fn latency_for(&self, position: usize) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Descending { step, total } => {
                let remaining = total.saturating_sub(position) as u32;
                *step * remaining
            }
        }
    }
}

/// Mock client configuration
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub latency: LatencyProfile,
    pub failures: FailurePattern,
}

/// In-memory [`RemoteCaller`]
///
/// Successful results carry `total_hits == position` and one hit whose id is
/// the position, so callers can check which input a result came from.
#[derive(Debug, Default)]
pub struct MockSearchClient {
    config: MockConfig,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSearchClient {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Every call succeeds after `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self::new(MockConfig {
            latency: LatencyProfile::Fixed(latency),
            failures: FailurePattern::Never,
        })
    }

    /// Total calls started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls currently executing
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed executing at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlightGuard<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard {
            counter: &self.in_flight,
        }
    }
}

// Decrements on drop so an abandoned call still leaves the probe balanced.
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Result the mock returns for a position
pub fn mock_result(position: usize) -> SearchResult {
    SearchResult {
        status: serde_json::json!({"total": 1, "failed": 0, "successful": 1}),
        total_hits: position as u64,
        hits: vec![SearchHit {
            index: "mock".to_string(),
            id: position.to_string(),
            score: 1.0,
            fields: None,
        }],
        took: 0,
        max_score: 1.0,
    }
}

impl RemoteCaller for MockSearchClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn call(&self, blob: &QueryBlob) -> Result<SearchResult, ErrorDetail> {
        let _guard = self.enter();
        let position = blob.position();

        let latency = self.config.latency.latency_for(position);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        trace!(position, "Mock call finished");

        if self.config.failures.fails(position) {
            Err(ErrorDetail::status(503, format!("mock failure at {position}")))
        } else {
            Ok(mock_result(position))
        }
    }
}
