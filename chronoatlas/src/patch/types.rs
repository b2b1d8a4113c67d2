//! Patch data model.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::coord::Coordinate;
use crate::resolution::Confidence;

/// The geographic scope of a patch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatchRegion {
    /// A lat/lon bounding box, inclusive on all edges.
    Bounds {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    /// A named area: applies wherever the base lookup resolved to this
    /// zone identity.
    Zone { zone_id: String },
}

impl PatchRegion {
    /// Whether this region covers the given coordinate, given the zone
    /// the base indexes resolved it to.
    pub fn covers(&self, coord: &Coordinate, base_zone: Option<&str>) -> bool {
        match self {
            Self::Bounds {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                (*min_lat..=*max_lat).contains(&coord.lat())
                    && (*min_lon..=*max_lon).contains(&coord.lon())
            }
            Self::Zone { zone_id } => base_zone == Some(zone_id.as_str()),
        }
    }

    /// Specificity rank for priority ordering: bounded boxes sort by
    /// ascending degree-area; zone-named regions are always less
    /// specific than any box.
    pub fn specificity(&self) -> f64 {
        match self {
            Self::Bounds {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => (max_lat - min_lat).abs() * (max_lon - min_lon).abs(),
            Self::Zone { .. } => f64::INFINITY,
        }
    }
}

/// What a matching patch does to the request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatchEffect {
    /// Replace the resolved zone identity; offset and DST then come
    /// from the override zone's own ruleset.
    ZoneOverride { zone_id: String },
    /// Pin the offset directly, bypassing the zone database. Used for
    /// pre-standardization local time and wartime clock regimes the
    /// database does not model.
    FixedOffsetOverride { offset_seconds: i32, dst: bool },
}

/// Which convention era a patch corrects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchEra {
    /// A correction of the historical record.
    #[default]
    Historical,
    /// An announced future convention change not yet in the zone
    /// database.
    Forward,
}

/// A hand-curated override of the base zone database for a specific
/// place and interval. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Patch {
    pub id: String,
    pub region: PatchRegion,
    /// Inclusive start of the patched interval, in local civil time.
    pub valid_from: NaiveDateTime,
    /// Exclusive end of the patched interval.
    pub valid_to: NaiveDateTime,
    pub effect: PatchEffect,
    /// Curator's confidence in the correction; caps the confidence of
    /// any result it touches.
    #[serde(default = "default_confidence")]
    pub confidence: Confidence,
    #[serde(default)]
    pub era: PatchEra,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_confidence() -> Confidence {
    Confidence::Medium
}

impl Patch {
    /// Whether the patched interval contains the local datetime
    /// (`[valid_from, valid_to)`).
    pub fn covers_datetime(&self, local: &NaiveDateTime) -> bool {
        *local >= self.valid_from && *local < self.valid_to
    }

    /// Width of the patched interval, for priority ordering.
    pub fn span_seconds(&self) -> i64 {
        (self.valid_to - self.valid_from).num_seconds()
    }
}
