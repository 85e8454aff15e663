//! Location samples
//!
//! Source records look like
//! `{"bklctrcb": {"geometry": {"coordinates": [lon, lat]}, "relationship": "..."}}`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ProducerError, Result};

#[derive(Debug, Deserialize)]
struct RawSample {
    bklctrcb: RawBody,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    geometry: RawGeometry,
    #[serde(default)]
    relationship: String,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Vec<f64>,
}

/// One usable sample: a point and a relationship term
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSample {
    pub lon: f64,
    pub lat: f64,
    pub relationship: String,
}

impl LocationSample {
    pub fn new(lon: f64, lat: f64, relationship: impl Into<String>) -> Self {
        Self {
            lon,
            lat,
            relationship: relationship.into(),
        }
    }
}

/// Parse samples from a JSON array
pub fn parse_samples(content: &str) -> Result<Vec<LocationSample>> {
    let raw: Vec<RawSample> = serde_json::from_str(content)
        .map_err(|e| ProducerError::sample_load("<inline>", e.to_string()))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, r)| match r.bklctrcb.geometry.coordinates.as_slice() {
            [lon, lat, ..] => Ok(LocationSample::new(*lon, *lat, r.bklctrcb.relationship)),
            _ => Err(ProducerError::invalid_sample(
                index,
                "coordinates need [lon, lat]",
            )),
        })
        .collect()
}

/// Load samples from a JSON file
pub fn load_samples(path: &Path) -> Result<Vec<LocationSample>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProducerError::sample_load(path.display().to_string(), e.to_string()))?;
    parse_samples(&content).map_err(|e| match e {
        ProducerError::SampleLoad { message, .. } => {
            ProducerError::sample_load(path.display().to_string(), message)
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_samples() {
        let content = r#"[
            {"bklctrcb": {"geometry": {"coordinates": [-122.41, 37.77]}, "relationship": "parent"}},
            {"bklctrcb": {"geometry": {"coordinates": [2.35, 48.85, 35.0]}, "relationship": "sibling"}}
        ]"#;
        let samples = parse_samples(content).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], LocationSample::new(-122.41, 37.77, "parent"));
        // Extra altitude is ignored
        assert_eq!(samples[1].lat, 48.85);
    }

    #[test]
    fn test_short_coordinates_rejected() {
        let content = r#"[
            {"bklctrcb": {"geometry": {"coordinates": [1.0, 2.0]}, "relationship": "a"}},
            {"bklctrcb": {"geometry": {"coordinates": [1.0]}, "relationship": "b"}}
        ]"#;
        let err = parse_samples(content).unwrap_err();
        assert!(matches!(err, ProducerError::InvalidSample { index: 1, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_samples(Path::new("/nonexistent/long-lat.json")).unwrap_err();
        assert!(err.to_string().contains("long-lat.json"));
    }
}
