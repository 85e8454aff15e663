//! Run statistics and metrics.

use std::time::Duration;

use contracts::RunSummary;
use observability::{MetricsSummary, RunMetricsAggregator};

/// Statistics from a batch run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Totals, failure kinds and latency distribution
    pub metrics: MetricsSummary,

    /// Wall time of the dispatch phase
    pub duration: Duration,

    /// Queries per second over the whole run
    pub throughput: f64,

    /// Run was cut short by a shutdown signal
    pub cancelled: bool,
}

impl RunStats {
    pub fn from_summary(summary: &RunSummary, cancelled: bool) -> Self {
        Self {
            metrics: RunMetricsAggregator::from_summary(summary).summary(),
            duration: summary.elapsed(),
            throughput: summary.throughput(),
            cancelled,
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("Successful: {}", self.metrics.successes);
        println!("Failed: {}", self.metrics.failures);

        println!("\n=== Run Statistics ===\n");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Queries: {}", self.metrics.total_queries);
        println!("   ├─ Throughput: {:.2} q/s", self.throughput);
        println!("   ├─ Failure rate: {:.2}%", self.metrics.failure_rate);
        println!("   ├─ Latency (ms): {}", self.metrics.latency_ms);
        println!("   └─ Total hits: {}", self.metrics.total_hits);

        if !self.metrics.failures_by_kind.is_empty() {
            println!("\n   Failures by kind");
            for (kind, count) in &self.metrics.failures_by_kind {
                println!("   ├─ {}: {}", kind, count);
            }
        }

        if self.cancelled {
            println!("\n   Run was cancelled before all queries completed");
        }

        println!();
    }
}
