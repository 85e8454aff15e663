//! LogSink - logs run summary via tracing

use contracts::{ContractError, ResultSink, RunSummary};
use tracing::{debug, info, instrument};

/// Sink that logs the run instead of persisting it
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_summary(&self, summary: &RunSummary) {
        info!(
            sink = %self.name,
            total = summary.len(),
            success = summary.success_count(),
            failure = summary.failure_count(),
            elapsed_ms = summary.elapsed().as_millis() as u64,
            "Run finished"
        );

        for outcome in summary.outcomes() {
            if let Some(error) = outcome.outcome.error() {
                debug!(
                    sink = %self.name,
                    position = outcome.position,
                    kind = error.kind(),
                    error = %error,
                    "Failed query"
                );
            }
        }
    }
}

impl ResultSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, summary),
        fields(sink = %self.name, records = summary.len())
    )]
    async fn write(&mut self, summary: &RunSummary) -> Result<(), ContractError> {
        self.log_summary(summary);
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        assert_eq!(sink.name(), "test_log");
        sink.write(&RunSummary::empty()).await.unwrap();
        sink.close().await.unwrap();
    }
}
