//! Zone boundary dataset format and polygon membership.

use serde::Deserialize;

/// On-disk boundary dataset: a version string plus an ordered list of
/// zone features. Feature order is load-bearing: it is the tie-break
/// for points claimed by more than one feature.
#[derive(Debug, Deserialize)]
pub struct BoundaryDataset {
    /// Dataset version, surfaced in result provenance.
    pub version: String,
    pub features: Vec<BoundaryFeature>,
}

/// A single zone feature: one or more rings in GeoJSON `[lon, lat]`
/// order. The first ring is the outer boundary, any further rings are
/// holes (even-odd membership handles both uniformly).
#[derive(Debug, Deserialize)]
pub struct BoundaryFeature {
    pub zone_id: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl BoundaryFeature {
    /// Even-odd membership test across all rings.
    ///
    /// A point on an edge may land on either side depending on
    /// floating-point rounding; the index's ordinal tie-break keeps the
    /// overall lookup deterministic regardless.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            if ring_crossings_odd(ring, lon, lat) {
                inside = !inside;
            }
        }
        inside
    }

    /// Axis-aligned bounding box over all rings as
    /// `(min_lon, min_lat, max_lon, max_lat)`.
    ///
    /// Returns `None` for a degenerate feature with no vertices.
    pub fn envelope(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for point in self.rings.iter().flatten() {
            let (lon, lat) = (point[0], point[1]);
            bounds = Some(match bounds {
                None => (lon, lat, lon, lat),
                Some((min_lon, min_lat, max_lon, max_lat)) => (
                    min_lon.min(lon),
                    min_lat.min(lat),
                    max_lon.max(lon),
                    max_lat.max(lat),
                ),
            });
        }
        bounds
    }
}

/// Ray-casting crossing parity for a single ring.
///
/// Casts a ray toward +infinity longitude and counts edge crossings.
/// The ring is treated as implicitly closed.
fn ring_crossings_odd(ring: &[[f64; 2]], lon: f64, lat: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut odd = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);

        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lon < x_cross {
                odd = !odd;
            }
        }
        j = i;
    }
    odd
}
