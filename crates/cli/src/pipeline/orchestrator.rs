//! Pipeline orchestrator - query store → dispatcher → sink.
//!
//! Runs against the HTTP endpoint, or against the in-process mock caller
//! when `mock` is set.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{QueryBlob, RemoteCaller, ResultSink, RunSummary, RunnerConfig};
use dispatcher::{create_sink, BoundedDispatcher};
use query_producer::{expand, QueryProducer, QueryStore};
use search_client::{HttpSearchClient, HttpSearchConfig, MockSearchClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::RunStats;

const MOCK_LATENCY: Duration = Duration::from_millis(5);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated run configuration
    pub runner: RunnerConfig,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Use the mock caller
    pub mock: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Cancelling `cancel` stops admission; the returned stats still cover
    /// every query.
    pub async fn run(self, cancel: CancellationToken) -> Result<RunStats> {
        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let blobs = self.load_queries()?;

        let summary = if self.config.mock {
            info!("Running in MOCK mode (no search server required)");
            let caller = Arc::new(MockSearchClient::with_latency(MOCK_LATENCY));
            self.dispatch(blobs, caller, cancel.clone()).await?
        } else {
            let endpoint = &self.config.runner.endpoint;
            let caller = HttpSearchClient::new(HttpSearchConfig::from(endpoint))
                .with_context(|| format!("Failed to build search client for {}", endpoint.host))?;
            info!(url = %caller.url(), "Search client configured");
            self.dispatch(blobs, Arc::new(caller), cancel.clone()).await?
        };

        observability::record_run_finished(&summary);

        if cancel.is_cancelled() {
            warn!("Run was cancelled; unfinished queries are reported as failures");
        }

        self.persist(&summary).await?;

        Ok(RunStats::from_summary(&summary, cancel.is_cancelled()))
    }

    /// Load (or generate) the store and expand it by iterations
    fn load_queries(&self) -> Result<Vec<QueryBlob>> {
        let queries = &self.config.runner.queries;
        let store = QueryStore::new(&queries.store_path);
        let producer = match queries.seed {
            Some(seed) => QueryProducer::with_seed(seed),
            None => QueryProducer::new(),
        };

        let defs = store
            .load_or_generate(&producer, &queries.samples_path, queries.count)
            .with_context(|| {
                format!(
                    "Failed to load query store {}",
                    queries.store_path.display()
                )
            })?;

        let iterations = self.config.runner.dispatch.iterations;
        let blobs = expand(&defs, iterations).context("Failed to expand queries")?;

        info!(
            definitions = defs.len(),
            iterations,
            total = blobs.len(),
            "Queries ready"
        );
        Ok(blobs)
    }

    async fn dispatch<C>(
        &self,
        blobs: Vec<QueryBlob>,
        caller: Arc<C>,
        cancel: CancellationToken,
    ) -> Result<RunSummary>
    where
        C: RemoteCaller + Sync + 'static,
    {
        let dispatcher = BoundedDispatcher::new(self.config.runner.dispatch.concurrency)?
            .with_cancellation(cancel);

        dispatcher
            .run(blobs, caller)
            .await
            .context("Dispatcher refused to start")
    }

    async fn persist(&self, summary: &RunSummary) -> Result<()> {
        let results = &self.config.runner.results;
        if !results.persist {
            info!("Result persistence disabled");
            return Ok(());
        }

        let mut sink = create_sink(results).context("Failed to create result sink")?;
        sink.write(summary)
            .await
            .with_context(|| format!("Failed to write results via {}", sink.name()))?;
        sink.close().await.context("Failed to close result sink")?;
        Ok(())
    }
}
