//! # Query Producer
//!
//! Builds the input sequence for a batch run.
//!
//! Responsibilities:
//! - Load location samples
//! - Generate query definitions in three shapes
//! - Persist and reload the query store
//! - Expand definitions × iterations into positioned `QueryBlob`s
//!
//! ## Usage Example
//!
//! ```ignore
//! use query_producer::{expand, QueryProducer, QueryStore};
//!
//! let store = QueryStore::new("queries.json");
//! let defs = store.load_or_generate(&QueryProducer::new(), "long-lat.json".as_ref(), 300)?;
//! let blobs = expand(&defs, 2)?;
//! ```

mod error;
mod producer;
mod sample;
mod shape;
mod store;

pub use error::{ProducerError, Result};
pub use producer::{expand, QueryProducer};
pub use sample::{load_samples, parse_samples, LocationSample};
pub use shape::{QueryShape, DISTANCE, LOCATION_FIELD, RELATIONSHIP_FIELD};
pub use store::QueryStore;
