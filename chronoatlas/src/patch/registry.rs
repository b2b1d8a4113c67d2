//! Patch registry: load, order, and match.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use thiserror::Error;

use super::types::{Patch, PatchEffect, PatchEra, PatchRegion};
use crate::coord::{Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::profile::PatchFilter;

/// Error type for patch registry operations.
///
/// A malformed patch set is fatal at startup; it is never skipped.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Patch dataset not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read patch dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse patch dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Patch '{id}' is invalid: {reason}")]
    InvalidPatch { id: String, reason: String },
    #[error("Duplicate patch id: '{0}'")]
    DuplicateId(String),
}

/// Ordered, immutable set of historical override rules.
///
/// Priority order is fixed once at load: more geographically specific
/// regions first (bounded boxes by ascending area, then zone-named
/// regions), ties broken by narrower validity span, then by position in
/// the source file. Matching returns the first hit only — patches never
/// stack, so at most one patch id ever appears in a result.
pub struct PatchRegistry {
    /// Patches in priority order.
    patches: Vec<Patch>,
}

impl PatchRegistry {
    /// Load a patch set from a JSON array file.
    ///
    /// # Errors
    ///
    /// Missing, unreadable, or malformed files are fatal, as are
    /// patches with inverted intervals, duplicate ids, or zone
    /// overrides naming unknown zones.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PatchError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PatchError::NotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let patches: Vec<Patch> = serde_json::from_reader(reader)?;
        Self::from_patches(patches)
    }

    /// Build a registry from already-parsed patches, preserving the
    /// input order as the last-resort tie-break.
    pub fn from_patches(patches: Vec<Patch>) -> Result<Self, PatchError> {
        for patch in &patches {
            if patch.valid_from >= patch.valid_to {
                return Err(PatchError::InvalidPatch {
                    id: patch.id.clone(),
                    reason: "valid_from must precede valid_to".to_string(),
                });
            }
            if let Some(reason) = invalid_bounds_reason(&patch.region) {
                return Err(PatchError::InvalidPatch {
                    id: patch.id.clone(),
                    reason,
                });
            }
            if let PatchEffect::ZoneOverride { zone_id } = &patch.effect {
                if zone_id.parse::<Tz>().is_err() {
                    return Err(PatchError::InvalidPatch {
                        id: patch.id.clone(),
                        reason: format!("unknown override zone '{zone_id}'"),
                    });
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for patch in &patches {
            if !seen.insert(patch.id.as_str()) {
                return Err(PatchError::DuplicateId(patch.id.clone()));
            }
        }

        let mut ordered: Vec<(usize, Patch)> = patches.into_iter().enumerate().collect();
        ordered.sort_by(|(ord_a, a), (ord_b, b)| {
            a.region
                .specificity()
                .total_cmp(&b.region.specificity())
                .then_with(|| a.span_seconds().cmp(&b.span_seconds()))
                .then_with(|| ord_a.cmp(ord_b))
        });
        let patches: Vec<Patch> = ordered.into_iter().map(|(_, p)| p).collect();

        tracing::info!(patches = patches.len(), "Loaded historical patch registry");
        Ok(Self { patches })
    }

    /// Find the highest-priority patch covering the coordinate and
    /// local datetime, honoring the plan's era filter.
    ///
    /// `base_zone` is the zone the spatial indexes resolved; zone-named
    /// patch regions match against it.
    pub fn find_match(
        &self,
        coord: &Coordinate,
        local: &NaiveDateTime,
        base_zone: Option<&str>,
        filter: PatchFilter,
    ) -> Option<&Patch> {
        self.patches
            .iter()
            .filter(|p| match filter {
                PatchFilter::All => true,
                PatchFilter::ForwardOnly => p.era == PatchEra::Forward,
                PatchFilter::Disabled => false,
            })
            .find(|p| p.region.covers(coord, base_zone) && p.covers_datetime(local))
    }

    /// Number of loaded patches.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

/// Reject bounded regions that could never cover any coordinate.
///
/// An inverted or out-of-range box would load cleanly but match
/// nothing, turning a curated correction into a silent no-op.
fn invalid_bounds_reason(region: &PatchRegion) -> Option<String> {
    let PatchRegion::Bounds {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    } = region
    else {
        return None;
    };

    for value in [min_lat, max_lat, min_lon, max_lon] {
        if !value.is_finite() {
            return Some("region bounds must be finite".to_string());
        }
    }
    if min_lat > max_lat {
        return Some(format!(
            "region min_lat {min_lat} exceeds max_lat {max_lat}"
        ));
    }
    if min_lon > max_lon {
        return Some(format!(
            "region min_lon {min_lon} exceeds max_lon {max_lon}"
        ));
    }
    if *min_lat < MIN_LAT || *max_lat > MAX_LAT {
        return Some(format!(
            "region latitude bounds [{min_lat}, {max_lat}] outside [{MIN_LAT}, {MAX_LAT}]"
        ));
    }
    if *min_lon < MIN_LON || *max_lon > MAX_LON {
        return Some(format!(
            "region longitude bounds [{min_lon}, {max_lon}] outside [{MIN_LON}, {MAX_LON}]"
        ));
    }
    None
}
