//! Query payloads
//!
//! A `QueryDefinition` is one stored query document; a `QueryBlob` is the
//! serialized, positioned unit of work the dispatcher consumes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Number of query shapes the producer emits per sample round
pub const QUERY_SHAPE_COUNT: usize = 3;

/// One query document as kept in the query store.
///
/// Opaque to everything except the producer: the runner only serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryDefinition(pub serde_json::Value);

impl QueryDefinition {
    /// Serialize to the request body bytes
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(&self.0).map(Bytes::from)
    }
}

/// Immutable serialized query with its stable input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlob {
    position: usize,
    body: Bytes,
}

impl QueryBlob {
    /// Create a blob at the given position
    pub fn new(position: usize, body: impl Into<Bytes>) -> Self {
        Self {
            position,
            body: body.into(),
        }
    }

    /// 0-based position in the input sequence
    pub fn position(&self) -> usize {
        self.position
    }

    /// Request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body length in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
