//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::RunnerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_batch(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;

    info!(
        host = %config.endpoint.host,
        index = %config.endpoint.index,
        concurrency = config.dispatch.concurrency,
        iterations = config.dispatch.iterations,
        store = %config.queries.store_path.display(),
        persist = config.results.persist,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        runner: config,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
        mock: args.mock,
    });

    // Ctrl+C stops admitting new queries; the run still reports every position
    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                _ = shutdown_signal() => {
                    warn!("Received shutdown signal, cancelling outstanding queries...");
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        }
    });

    info!("Starting batch...");
    let result = pipeline.run(cancel.clone()).await;
    signal_task.abort();

    let stats = result.context("Batch execution failed")?;
    stats.print_summary();

    info!(
        success = stats.metrics.successes,
        failure = stats.metrics.failures,
        cancelled = stats.cancelled,
        "Batch Search finished"
    );
    Ok(())
}

/// Config file (when present) + flag overrides, validated
fn resolve_config(args: &RunArgs) -> Result<RunnerConfig> {
    let mut config = if args.config.exists() {
        info!(config = %args.config.display(), "Loading configuration");
        config_loader::ConfigLoader::parse_from_path(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?
    } else {
        info!(
            config = %args.config.display(),
            "No configuration file, using defaults and flags"
        );
        RunnerConfig::default()
    };

    apply_overrides(&mut config, args);

    config_loader::ConfigLoader::validate(&config)
        .map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(config)
}

fn apply_overrides(config: &mut RunnerConfig, args: &RunArgs) {
    if let Some(ref host) = args.host {
        config.endpoint.host = host.clone();
    }
    if let Some(ref user) = args.user {
        config.endpoint.username = user.clone();
    }
    if let Some(ref pass) = args.pass {
        config.endpoint.password = pass.clone();
    }
    if let Some(ref index) = args.index {
        config.endpoint.index = index.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.endpoint.timeout_secs = timeout;
    }
    if let Some(concurrency) = args.concurrency {
        config.dispatch.concurrency = concurrency;
    }
    if let Some(iterations) = args.iterations {
        config.dispatch.iterations = iterations;
    }
    if let Some(count) = args.num_queries {
        config.queries.count = count;
    }
    if let Some(ref store) = args.store {
        config.queries.store_path = store.clone();
    }
    if let Some(ref samples) = args.samples {
        config.queries.samples_path = samples.clone();
    }
    if args.seed.is_some() {
        config.queries.seed = args.seed;
    }
    if let Some(persist) = args.print_results {
        config.results.persist = persist;
    }
    if let Some(ref results) = args.results {
        config.results.path = results.clone();
    }
    // The mock caller never touches the network
    if args.mock && config.endpoint.host.is_empty() {
        config.endpoint.host = "http://mock.invalid".to_string();
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &RunnerConfig) {
    let total = config.queries.count * config.dispatch.iterations;

    println!("\n=== Configuration Summary ===\n");
    println!("Endpoint:");
    println!("  Host: {}", config.endpoint.host);
    println!("  Index: {}", config.endpoint.index);
    println!("  User: {}", config.endpoint.username);
    println!("  Timeout: {}s", config.endpoint.timeout_secs);
    println!("\nDispatch:");
    println!("  Concurrency: {}", config.dispatch.concurrency);
    println!("  Iterations: {}", config.dispatch.iterations);
    println!("  Total calls: {}", total);
    println!("\nQueries:");
    println!("  Store: {}", config.queries.store_path.display());
    println!("  Samples: {}", config.queries.samples_path.display());
    println!("  Count: {}", config.queries.count);
    if let Some(seed) = config.queries.seed {
        println!("  Seed: {}", seed);
    }
    println!("\nResults:");
    if config.results.persist {
        println!(
            "  {:?} -> {}",
            config.results.sink,
            config.results.path.display()
        );
    } else {
        println!("  Not persisted");
    }
    println!();
}
