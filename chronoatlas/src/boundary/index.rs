//! R-tree backed point-in-zone lookup.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use rstar::{RTree, RTreeObject, AABB};
use thiserror::Error;

use super::dataset::{BoundaryDataset, BoundaryFeature};
use crate::coord::Coordinate;

/// Error type for boundary index operations.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Boundary dataset not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read boundary dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse boundary dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Boundary dataset contains no features")]
    Empty,
    #[error("Boundary feature '{zone_id}' is invalid: {reason}")]
    InvalidFeature { zone_id: String, reason: String },
}

/// Envelope entry stored in the R-tree; the polygon itself lives in the
/// feature vector and is addressed by ordinal.
struct FeatureEnvelope {
    ordinal: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for FeatureEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Point-in-zone index over the boundary dataset.
///
/// Immutable after [`BoundaryIndex::load`]; lookups are pure reads and
/// need no locking. The R-tree narrows candidates by envelope, then
/// exact ring membership decides. When more than one feature claims a
/// point (shared edges, dataset overlaps) the feature with the lowest
/// dataset ordinal wins — a fixed policy, not an error.
pub struct BoundaryIndex {
    features: Vec<BoundaryFeature>,
    tree: RTree<FeatureEnvelope>,
    version: String,
}

impl BoundaryIndex {
    /// Load and index a boundary dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Any missing, unreadable, or malformed dataset is an error; a
    /// feature whose `zone_id` is not a known IANA zone, or that has no
    /// vertices, is also rejected. Partial loads never succeed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BoundaryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BoundaryError::NotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let dataset: BoundaryDataset = serde_json::from_reader(reader)?;
        Self::from_dataset(dataset)
    }

    /// Build the index from an already-parsed dataset.
    pub fn from_dataset(dataset: BoundaryDataset) -> Result<Self, BoundaryError> {
        if dataset.features.is_empty() {
            return Err(BoundaryError::Empty);
        }

        let mut envelopes = Vec::with_capacity(dataset.features.len());
        for (ordinal, feature) in dataset.features.iter().enumerate() {
            if feature.zone_id.parse::<Tz>().is_err() {
                return Err(BoundaryError::InvalidFeature {
                    zone_id: feature.zone_id.clone(),
                    reason: "not a known IANA zone identifier".to_string(),
                });
            }
            let (min_lon, min_lat, max_lon, max_lat) =
                feature
                    .envelope()
                    .ok_or_else(|| BoundaryError::InvalidFeature {
                        zone_id: feature.zone_id.clone(),
                        reason: "feature has no vertices".to_string(),
                    })?;
            envelopes.push(FeatureEnvelope {
                ordinal,
                aabb: AABB::from_corners([min_lon, min_lat], [max_lon, max_lat]),
            });
        }

        let tree = RTree::bulk_load(envelopes);
        tracing::info!(
            features = dataset.features.len(),
            version = %dataset.version,
            "Built zone boundary index"
        );

        Ok(Self {
            features: dataset.features,
            tree,
            version: dataset.version,
        })
    }

    /// Look up the zone identity covering a coordinate.
    ///
    /// Returns `None` when no feature contains the point (open ocean,
    /// dataset gaps); the caller falls back to the settlement index.
    pub fn lookup(&self, coord: &Coordinate) -> Option<&str> {
        let point = [coord.lon(), coord.lat()];
        let probe = AABB::from_point(point);

        // Lowest ordinal wins among all containing features.
        self.tree
            .locate_in_envelope_intersecting(&probe)
            .filter(|entry| self.features[entry.ordinal].contains(point[0], point[1]))
            .map(|entry| entry.ordinal)
            .min()
            .map(|ordinal| self.features[ordinal].zone_id.as_str())
    }

    /// Dataset version string for provenance.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of indexed features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(zone_id: &str, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> BoundaryFeature {
        BoundaryFeature {
            zone_id: zone_id.to_string(),
            rings: vec![vec![
                [min_lon, min_lat],
                [max_lon, min_lat],
                [max_lon, max_lat],
                [min_lon, max_lat],
                [min_lon, min_lat],
            ]],
        }
    }

    fn test_index() -> BoundaryIndex {
        BoundaryIndex::from_dataset(BoundaryDataset {
            version: "test.1".to_string(),
            features: vec![
                rect("Europe/Amsterdam", 3.3, 50.7, 7.2, 53.6),
                rect("Europe/Berlin", 5.8, 47.2, 15.1, 55.1),
                rect("Europe/London", -8.2, 49.9, 1.8, 58.7),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_lookup_hit() {
        let index = test_index();
        let london = Coordinate::new(51.5074, -0.1278).unwrap();
        assert_eq!(index.lookup(&london), Some("Europe/London"));
    }

    #[test]
    fn test_lookup_miss_in_ocean() {
        let index = test_index();
        let atlantic = Coordinate::new(40.0, -35.0).unwrap();
        assert_eq!(index.lookup(&atlantic), None);
    }

    #[test]
    fn test_overlap_tie_break_is_lowest_ordinal() {
        let index = test_index();
        // Inside both the Amsterdam and Berlin rectangles; Amsterdam is
        // first in the dataset, so it must win.
        let overlap = Coordinate::new(52.0, 6.5).unwrap();
        assert_eq!(index.lookup(&overlap), Some("Europe/Amsterdam"));
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let index = test_index();
        let coord = Coordinate::new(52.0, 6.5).unwrap();
        let first = index.lookup(&coord).map(str::to_string);
        for _ in 0..100 {
            assert_eq!(index.lookup(&coord).map(str::to_string), first);
        }
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let result = BoundaryIndex::from_dataset(BoundaryDataset {
            version: "test.1".to_string(),
            features: vec![],
        });
        assert!(matches!(result, Err(BoundaryError::Empty)));
    }

    #[test]
    fn test_unknown_zone_id_rejected() {
        let result = BoundaryIndex::from_dataset(BoundaryDataset {
            version: "test.1".to_string(),
            features: vec![rect("Atlantis/Capital", 0.0, 0.0, 1.0, 1.0)],
        });
        assert!(matches!(
            result,
            Err(BoundaryError::InvalidFeature { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = BoundaryIndex::load("/nonexistent/boundaries.json");
        assert!(matches!(result, Err(BoundaryError::NotFound(_))));
    }
}
