//! Configuration validation
//!
//! Rules:
//! - endpoint host present with an http(s) scheme, index present
//! - timeout_secs > 0
//! - concurrency >= 1, iterations >= 1
//! - query count > 0 and divisible by the shape count
//! - file sink has an output path when persisting

use contracts::{ContractError, RunnerConfig, SinkType, QUERY_SHAPE_COUNT};

/// Validate a RunnerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RunnerConfig) -> Result<(), ContractError> {
    validate_endpoint(config)?;
    validate_dispatch(config)?;
    validate_queries(config)?;
    validate_results(config)?;
    Ok(())
}

fn validate_endpoint(config: &RunnerConfig) -> Result<(), ContractError> {
    let endpoint = &config.endpoint;

    if endpoint.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "endpoint.host",
            "host cannot be empty",
        ));
    }
    if !(endpoint.host.starts_with("http://") || endpoint.host.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "endpoint.host",
            format!("host '{}' must start with http:// or https://", endpoint.host),
        ));
    }
    if endpoint.index.trim().is_empty() {
        return Err(ContractError::config_validation(
            "endpoint.index",
            "index cannot be empty",
        ));
    }
    if endpoint.timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "endpoint.timeout_secs",
            "timeout_secs must be > 0",
        ));
    }
    Ok(())
}

fn validate_dispatch(config: &RunnerConfig) -> Result<(), ContractError> {
    if config.dispatch.concurrency < 1 {
        return Err(ContractError::config_validation(
            "dispatch.concurrency",
            format!(
                "concurrency must be >= 1, got {}",
                config.dispatch.concurrency
            ),
        ));
    }
    if config.dispatch.iterations < 1 {
        return Err(ContractError::config_validation(
            "dispatch.iterations",
            format!("iterations must be >= 1, got {}", config.dispatch.iterations),
        ));
    }
    Ok(())
}

fn validate_queries(config: &RunnerConfig) -> Result<(), ContractError> {
    let count = config.queries.count;
    if count == 0 || !count.is_multiple_of(QUERY_SHAPE_COUNT) {
        return Err(ContractError::config_validation(
            "queries.count",
            format!("count must be a positive multiple of {QUERY_SHAPE_COUNT}, got {count}"),
        ));
    }
    Ok(())
}

fn validate_results(config: &RunnerConfig) -> Result<(), ContractError> {
    let results = &config.results;
    if results.persist
        && results.sink == SinkType::File
        && results.path.as_os_str().is_empty()
    {
        return Err(ContractError::config_validation(
            "results.path",
            "results path cannot be empty for the file sink",
        ));
    }
    Ok(())
}
