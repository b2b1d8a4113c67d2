//! R-tree nearest-neighbor index over the settlement catalog.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::Deserialize;
use thiserror::Error;

use crate::coord::{haversine_km, Coordinate};

/// Error type for settlement index operations.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Settlement catalog not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read settlement catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settlement catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Settlement catalog is empty")]
    Empty,
    #[error("Settlement '{name}' is invalid: {reason}")]
    InvalidSettlement { name: String, reason: String },
}

/// One catalog entry as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct SettlementRecord {
    name: String,
    lat: f64,
    lon: f64,
    zone_id: String,
}

/// Spatial index entry for a settlement.
///
/// Position is `[lon, lat]` in degrees. Nearest-neighbor selection uses
/// planar degree distance, which is adequate for the catalog's spacing;
/// the reported distance is recomputed with haversine.
struct SettlementPoint {
    position: [f64; 2],
    ordinal: usize,
}

impl RTreeObject for SettlementPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for SettlementPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = point[0] - self.position[0];
        let dy = point[1] - self.position[1];
        dx * dx + dy * dy
    }
}

/// Result of a fallback query: the matched settlement, its zone, and
/// how far away it is.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestSettlement {
    pub name: String,
    pub zone_id: String,
    pub distance_km: f64,
}

/// Nearest-neighbor index over the settlement catalog.
///
/// Built once at startup, read-only afterward.
pub struct SettlementIndex {
    records: Vec<SettlementRecord>,
    tree: RTree<SettlementPoint>,
}

impl SettlementIndex {
    /// Load and index a settlement catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Missing, unreadable, malformed, or empty catalogs are errors, as
    /// is any record with an out-of-range coordinate or an unknown zone
    /// identifier. Partial loads never succeed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettlementError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettlementError::NotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let records: Vec<SettlementRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    fn from_records(records: Vec<SettlementRecord>) -> Result<Self, SettlementError> {
        if records.is_empty() {
            return Err(SettlementError::Empty);
        }

        let mut points = Vec::with_capacity(records.len());
        for (ordinal, record) in records.iter().enumerate() {
            Coordinate::new(record.lat, record.lon).map_err(|e| {
                SettlementError::InvalidSettlement {
                    name: record.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            if record.zone_id.parse::<Tz>().is_err() {
                return Err(SettlementError::InvalidSettlement {
                    name: record.name.clone(),
                    reason: format!("unknown zone identifier '{}'", record.zone_id),
                });
            }
            points.push(SettlementPoint {
                position: [record.lon, record.lat],
                ordinal,
            });
        }

        let tree = RTree::bulk_load(points);
        tracing::info!(settlements = records.len(), "Built settlement fallback index");

        Ok(Self { records, tree })
    }

    /// Find the settlement nearest to a coordinate.
    ///
    /// The catalog is validated non-empty at load, so this only returns
    /// `None` if the tree is somehow empty.
    pub fn nearest(&self, coord: &Coordinate) -> Option<NearestSettlement> {
        let point = self.tree.nearest_neighbor(&[coord.lon(), coord.lat()])?;
        let record = &self.records[point.ordinal];
        // Validated at load time.
        let settlement_coord = Coordinate::new(record.lat, record.lon).ok()?;

        Some(NearestSettlement {
            name: record.name.clone(),
            zone_id: record.zone_id.clone(),
            distance_km: haversine_km(coord, &settlement_coord),
        })
    }

    /// Number of catalog entries.
    pub fn settlement_count(&self) -> usize {
        self.records.len()
    }
}
