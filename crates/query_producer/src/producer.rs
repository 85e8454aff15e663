//! QueryProducer - samples to positioned query blobs

use contracts::{QueryBlob, QueryDefinition, QUERY_SHAPE_COUNT};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, instrument};

use crate::error::{ProducerError, Result};
use crate::sample::LocationSample;
use crate::shape::QueryShape;

/// Generates query definitions from a sample pool
///
/// Count and shape order depend only on `count`; which sample feeds each
/// round is random unless a seed is set.
#[derive(Debug, Clone, Default)]
pub struct QueryProducer {
    seed: Option<u64>,
}

impl QueryProducer {
    /// Producer with OS-seeded sample selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer with reproducible sample selection
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Produce `count` query definitions
    ///
    /// # Errors
    /// - `count` not a multiple of the shape count
    /// - empty sample pool
    #[instrument(name = "query_producer_produce", skip(self, samples), fields(samples = samples.len()))]
    pub fn produce(&self, samples: &[LocationSample], count: usize) -> Result<Vec<QueryDefinition>> {
        if !count.is_multiple_of(QUERY_SHAPE_COUNT) {
            return Err(ProducerError::UnevenCount { count });
        }
        if samples.is_empty() {
            return Err(ProducerError::EmptySamples);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let rounds = count / QUERY_SHAPE_COUNT;
        let mut queries = Vec::with_capacity(count);
        for _ in 0..rounds {
            let Some(sample) = samples.choose(&mut rng) else {
                return Err(ProducerError::EmptySamples);
            };
            queries.extend(QueryShape::ALL.iter().map(|shape| shape.build(sample)));
        }

        debug!(count = queries.len(), rounds, "Queries produced");
        Ok(queries)
    }
}

/// Serialize definitions and repeat the list `iterations` times
///
/// Positions run 0..len*iterations in emission order.
pub fn expand(defs: &[QueryDefinition], iterations: usize) -> Result<Vec<QueryBlob>> {
    if iterations < 1 {
        return Err(ProducerError::InvalidIterations(iterations));
    }

    let bodies = defs
        .iter()
        .enumerate()
        .map(|(index, def)| {
            def.to_bytes()
                .map_err(|source| ProducerError::Serialize { index, source })
        })
        .collect::<Result<Vec<_>>>()?;

    let blobs = (0..iterations)
        .flat_map(|_| bodies.iter().cloned())
        .enumerate()
        .map(|(position, body)| QueryBlob::new(position, body))
        .collect();

    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<LocationSample> {
        vec![
            LocationSample::new(1.0, 2.0, "a"),
            LocationSample::new(3.0, 4.0, "b"),
            LocationSample::new(5.0, 6.0, "c"),
        ]
    }

    #[test]
    fn test_rejects_uneven_count() {
        let err = QueryProducer::new().produce(&pool(), 10).unwrap_err();
        assert!(matches!(err, ProducerError::UnevenCount { count: 10 }));
    }

    #[test]
    fn test_rejects_empty_pool() {
        let err = QueryProducer::new().produce(&[], 3).unwrap_err();
        assert!(matches!(err, ProducerError::EmptySamples));
    }

    #[test]
    fn test_zero_count_is_empty() {
        let defs = QueryProducer::new().produce(&pool(), 0).unwrap();
        assert!(defs.is_empty());
    }

    #[test]
    fn test_shape_distribution_is_deterministic() {
        let defs = QueryProducer::new().produce(&pool(), 30).unwrap();
        assert_eq!(defs.len(), 30);
        for (i, def) in defs.iter().enumerate() {
            let expected = QueryShape::ALL[i % QUERY_SHAPE_COUNT];
            assert_eq!(QueryShape::detect(def), Some(expected), "query {i}");
        }
    }

    #[test]
    fn test_round_uses_one_sample_for_all_shapes() {
        let defs = QueryProducer::with_seed(3).produce(&pool(), 3).unwrap();
        let lon = &defs[0].0["query"]["location"]["lon"];
        let rel = &defs[1].0["query"]["match"];
        let conj = &defs[2].0["query"]["conjuncts"];
        assert_eq!(&conj[0]["location"]["lon"], lon);
        assert_eq!(&conj[1]["match"], rel);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = QueryProducer::with_seed(7).produce(&pool(), 60).unwrap();
        let b = QueryProducer::with_seed(7).produce(&pool(), 60).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expand_repeats_with_positions() {
        let defs = QueryProducer::with_seed(1).produce(&pool(), 6).unwrap();
        let blobs = expand(&defs, 3).unwrap();
        assert_eq!(blobs.len(), 18);
        for (i, blob) in blobs.iter().enumerate() {
            assert_eq!(blob.position(), i);
        }
        // Second iteration repeats the first
        assert_eq!(blobs[0].body(), blobs[6].body());
        assert_eq!(blobs[5].body(), blobs[17].body());
    }

    #[test]
    fn test_expand_rejects_zero_iterations() {
        assert!(matches!(
            expand(&[], 0),
            Err(ProducerError::InvalidIterations(0))
        ));
    }
}
