//! `generate` command implementation.

use anyhow::{Context, Result};
use query_producer::{load_samples, QueryProducer, QueryShape, QueryStore};
use tracing::info;

use crate::cli::GenerateArgs;
use crate::error::CliError;

/// Execute the `generate` command
pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let store = QueryStore::new(&args.output);
    if store.exists() && !args.force {
        return Err(CliError::store_exists(args.output.display().to_string()).into());
    }

    info!(
        samples = %args.samples.display(),
        count = args.num_queries,
        "Generating query store"
    );

    let samples = load_samples(&args.samples)
        .with_context(|| format!("Failed to load samples from {}", args.samples.display()))?;

    let producer = match args.seed {
        Some(seed) => QueryProducer::with_seed(seed),
        None => QueryProducer::new(),
    };
    let defs = producer
        .produce(&samples, args.num_queries)
        .context("Failed to generate queries")?;

    store
        .save(&defs)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Generated {} queries from {} samples -> {}",
        defs.len(),
        samples.len(),
        args.output.display()
    );
    for shape in QueryShape::ALL {
        let n = defs
            .iter()
            .filter(|d| QueryShape::detect(d) == Some(shape))
            .count();
        println!("  {:?}: {}", shape, n);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLES: &str = r#"[
        {"bklctrcb": {"geometry": {"coordinates": [-122.4, 37.7]}, "relationship": "parent"}},
        {"bklctrcb": {"geometry": {"coordinates": [2.35, 48.85]}, "relationship": "child"}}
    ]"#;

    fn args(dir: &std::path::Path, force: bool) -> GenerateArgs {
        GenerateArgs {
            samples: dir.join("long-lat.json"),
            output: dir.join("queries.json"),
            num_queries: 9,
            seed: Some(5),
            force,
        }
    }

    #[test]
    fn test_generate_writes_store() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("long-lat.json"), SAMPLES).unwrap();

        run_generate(&args(dir.path(), false)).unwrap();

        let defs = QueryStore::new(dir.path().join("queries.json")).load().unwrap();
        assert_eq!(defs.len(), 9);
    }

    #[test]
    fn test_generate_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("long-lat.json"), SAMPLES).unwrap();
        fs::write(dir.path().join("queries.json"), "[]").unwrap();

        let err = run_generate(&args(dir.path(), false)).unwrap_err();
        assert!(err.to_string().contains("--force"));

        run_generate(&args(dir.path(), true)).unwrap();
        let defs = QueryStore::new(dir.path().join("queries.json")).load().unwrap();
        assert_eq!(defs.len(), 9);
    }
}
