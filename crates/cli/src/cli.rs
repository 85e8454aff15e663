//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Batch Search - bounded-concurrency query runner for a full-text search index
#[derive(Parser, Debug)]
#[command(
    name = "batch-search",
    author,
    version,
    about = "Bounded-concurrency batch query runner",
    long_about = "Runs a batch of generated search queries against a search index.\n\n\
                  Loads or generates the query store, repeats it for the configured \n\
                  iterations, dispatches every query with at most N in flight and \n\
                  reports per-query success or failure."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BATCH_SEARCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "BATCH_SEARCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the batch against the search endpoint
    Run(RunArgs),

    /// Generate the query store from location samples
    Generate(GenerateArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); optional, flags alone are enough
    #[arg(
        short,
        long,
        default_value = "batch-search.toml",
        env = "BATCH_SEARCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Search endpoint base URL, e.g. http://localhost:8094
    #[arg(long, env = "BATCH_SEARCH_HOST")]
    pub host: Option<String>,

    /// Username for basic auth
    #[arg(long, env = "BATCH_SEARCH_USER")]
    pub user: Option<String>,

    /// Password for basic auth
    #[arg(long, env = "BATCH_SEARCH_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Target index name
    #[arg(long, env = "BATCH_SEARCH_INDEX")]
    pub index: Option<String>,

    /// Maximum number of queries in flight
    #[arg(long, env = "BATCH_SEARCH_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Times the whole query list is sent
    #[arg(long, env = "BATCH_SEARCH_ITERATIONS")]
    pub iterations: Option<usize>,

    /// Queries to generate when the store is missing (multiple of 3)
    #[arg(long, env = "BATCH_SEARCH_NUM_QUERIES")]
    pub num_queries: Option<usize>,

    /// Per-call timeout in seconds
    #[arg(long, env = "BATCH_SEARCH_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Query store path
    #[arg(long, env = "BATCH_SEARCH_STORE")]
    pub store: Option<PathBuf>,

    /// Location samples used when generating the store
    #[arg(long, env = "BATCH_SEARCH_SAMPLES")]
    pub samples: Option<PathBuf>,

    /// Seed for reproducible query generation
    #[arg(long, env = "BATCH_SEARCH_SEED")]
    pub seed: Option<u64>,

    /// Persist per-query results (`--print-results=false` to skip)
    #[arg(
        long,
        env = "BATCH_SEARCH_PRINT_RESULTS",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub print_results: Option<bool>,

    /// Results file path
    #[arg(long, env = "BATCH_SEARCH_RESULTS")]
    pub results: Option<PathBuf>,

    /// Use the in-process mock caller instead of HTTP
    #[arg(long)]
    pub mock: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BATCH_SEARCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `generate` command
#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    /// Location samples file
    #[arg(long, default_value = "long-lat.json", env = "BATCH_SEARCH_SAMPLES")]
    pub samples: PathBuf,

    /// Output query store
    #[arg(short, long, default_value = "queries.json", env = "BATCH_SEARCH_STORE")]
    pub output: PathBuf,

    /// Number of queries (multiple of 3)
    #[arg(short = 'n', long, default_value = "300", env = "BATCH_SEARCH_NUM_QUERIES")]
    pub num_queries: usize,

    /// Seed for reproducible sample selection
    #[arg(long, env = "BATCH_SEARCH_SEED")]
    pub seed: Option<u64>,

    /// Overwrite an existing store
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "batch-search.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
