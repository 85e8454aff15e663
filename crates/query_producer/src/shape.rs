//! Query shapes
//!
//! Each sample round emits one query per shape, in `QueryShape::ALL` order.

use contracts::QueryDefinition;
use serde_json::{json, Value};

use crate::sample::LocationSample;

/// Radius used by geo-distance queries
pub const DISTANCE: &str = "100mi";
/// Indexed field holding the point
pub const LOCATION_FIELD: &str = "bklctrcb.geometry.coordinates";
/// Indexed field holding the relationship term
pub const RELATIONSHIP_FIELD: &str = "bklctrcb.relationship";

/// Supported query shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Geo-distance around the sample point
    Location,
    /// Match on the relationship term
    Relationship,
    /// Both of the above, conjoined
    Conjunct,
}

impl QueryShape {
    pub const ALL: [QueryShape; 3] = [Self::Location, Self::Relationship, Self::Conjunct];

    /// Build the query document for a sample
    pub fn build(self, sample: &LocationSample) -> QueryDefinition {
        let body = match self {
            Self::Location => location_clause(sample),
            Self::Relationship => relationship_clause(sample),
            Self::Conjunct => json!({
                "conjuncts": [location_clause(sample), relationship_clause(sample)]
            }),
        };
        QueryDefinition(json!({ "query": body }))
    }

    /// Classify a stored query document
    pub fn detect(def: &QueryDefinition) -> Option<Self> {
        let query = def.0.get("query")?;
        if query.get("conjuncts").is_some() {
            Some(Self::Conjunct)
        } else if query.get("location").is_some() {
            Some(Self::Location)
        } else if query.get("match").is_some() {
            Some(Self::Relationship)
        } else {
            None
        }
    }
}

fn location_clause(sample: &LocationSample) -> Value {
    json!({
        "location": { "lon": sample.lon, "lat": sample.lat },
        "distance": DISTANCE,
        "field": LOCATION_FIELD,
    })
}

fn relationship_clause(sample: &LocationSample) -> Value {
    json!({
        "match": sample.relationship,
        "field": RELATIONSHIP_FIELD,
    })
}
