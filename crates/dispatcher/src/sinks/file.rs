//! FileSink - writes the results store as a JSON array

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{ContractError, ResultSink, RunSummary};
use tracing::{debug, error, info, instrument};

/// Sink that writes one record per input position to a single file
///
/// The file is replaced on every write; parent directories are created on
/// demand.
pub struct FileSink {
    name: String,
    path: PathBuf,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_records(&self, summary: &RunSummary) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &summary.records())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl ResultSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, summary),
        fields(sink = %self.name, records = summary.len())
    )]
    async fn write(&mut self, summary: &RunSummary) -> Result<(), ContractError> {
        self.write_records(summary).map_err(|e| {
            error!(sink = %self.name, path = %self.path.display(), error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;

        info!(path = %self.path.display(), records = summary.len(), "Results written");
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ErrorDetail, Outcome, OutcomeRecord, QueryOutcome, SearchResult};
    use std::time::Duration;
    use tempfile::tempdir;

    fn summary() -> RunSummary {
        let outcomes = vec![
            QueryOutcome {
                position: 0,
                outcome: Outcome::Success(SearchResult {
                    total_hits: 3,
                    ..Default::default()
                }),
                latency: Duration::from_millis(8),
            },
            QueryOutcome::not_run(1, ErrorDetail::Cancelled),
        ];
        RunSummary::new(1, 1, outcomes, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_file_sink_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        let mut sink = FileSink::new("results", &path);
        sink.write(&summary()).await.unwrap();
        sink.close().await.unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let records: Vec<OutcomeRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].success);
        assert_eq!(records[0].result.as_ref().map(|r| r.total_hits), Some(3));
        assert_eq!(records[1].position, 1);
        assert_eq!(records[1].error, Some(ErrorDetail::Cancelled));
    }

    #[tokio::test]
    async fn test_file_sink_unwritable_path() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a file
        let mut sink = FileSink::new("results", dir.path());
        let err = sink.write(&summary()).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
    }
}
