//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{RunnerConfig, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    host: String,
    index: String,
    concurrency: usize,
    iterations: usize,
    query_count: usize,
    total_calls: usize,
    persist: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(
                crate::error::CliError::config_not_found(args.config.display().to_string())
                    .to_string(),
            ),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    host: config.endpoint.host.clone(),
                    index: config.endpoint.index.clone(),
                    concurrency: config.dispatch.concurrency,
                    iterations: config.dispatch.iterations,
                    query_count: config.queries.count,
                    total_calls: config.queries.count * config.dispatch.iterations,
                    persist: config.results.persist,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &RunnerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.results.persist {
        warnings.push("results.persist is false - per-query results will not be saved".to_string());
    } else if config.results.sink == SinkType::Log {
        warnings.push("results.sink is 'log' - only a summary will be logged".to_string());
    }

    if config.endpoint.username == "username" && config.endpoint.password == "password" {
        warnings.push("endpoint credentials are the built-in defaults".to_string());
    }

    let total = config.queries.count * config.dispatch.iterations;
    if config.dispatch.concurrency > total {
        warnings.push(format!(
            "dispatch.concurrency ({}) exceeds total calls ({}) - extra slots stay idle",
            config.dispatch.concurrency, total
        ));
    }

    if !config.queries.store_path.exists() && !config.queries.samples_path.exists() {
        warnings.push(format!(
            "neither query store '{}' nor samples '{}' exist - run will fail",
            config.queries.store_path.display(),
            config.queries.samples_path.display()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Host: {}", summary.host);
            println!("  Index: {}", summary.index);
            println!("  Concurrency: {}", summary.concurrency);
            println!(
                "  Queries: {} x {} iterations = {} calls",
                summary.query_count, summary.iterations, summary.total_calls
            );
            println!("  Persist results: {}", summary.persist);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
