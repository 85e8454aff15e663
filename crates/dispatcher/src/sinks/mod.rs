//! Sink implementations
//!
//! Contains FileSink and LogSink, plus the config-selected [`ConfiguredSink`].

mod file;
mod log;

use contracts::{ContractError, ResultSink, ResultsConfig, RunSummary, SinkType};
use tracing::instrument;

use crate::error::DispatchError;

pub use self::file::FileSink;
pub use self::log::LogSink;

/// Sink picked by `ResultsConfig::sink`
pub enum ConfiguredSink {
    File(FileSink),
    Log(LogSink),
}

impl ResultSink for ConfiguredSink {
    fn name(&self) -> &str {
        match self {
            Self::File(sink) => sink.name(),
            Self::Log(sink) => sink.name(),
        }
    }

    async fn write(&mut self, summary: &RunSummary) -> Result<(), ContractError> {
        match self {
            Self::File(sink) => sink.write(summary).await,
            Self::Log(sink) => sink.write(summary).await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::File(sink) => sink.close().await,
            Self::Log(sink) => sink.close().await,
        }
    }
}

/// Create a sink from configuration
#[instrument(name = "dispatcher_create_sink", skip(config), fields(sink_type = ?config.sink))]
pub fn create_sink(config: &ResultsConfig) -> Result<ConfiguredSink, DispatchError> {
    match config.sink {
        SinkType::File => {
            if config.path.as_os_str().is_empty() {
                return Err(DispatchError::sink_creation("file", "output path is empty"));
            }
            Ok(ConfiguredSink::File(FileSink::new("file", &config.path)))
        }
        SinkType::Log => Ok(ConfiguredSink::Log(LogSink::new("log"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_create_sink_from_config() {
        let mut config = ResultsConfig {
            sink: SinkType::Log,
            ..Default::default()
        };
        assert!(matches!(create_sink(&config), Ok(ConfiguredSink::Log(_))));

        config.sink = SinkType::File;
        config.path = PathBuf::from("out/results.json");
        match create_sink(&config) {
            Ok(ConfiguredSink::File(sink)) => assert_eq!(sink.path(), config.path.as_path()),
            _ => panic!("expected file sink"),
        }

        config.path = PathBuf::new();
        assert!(matches!(
            create_sink(&config),
            Err(DispatchError::SinkCreation { .. })
        ));
    }
}
