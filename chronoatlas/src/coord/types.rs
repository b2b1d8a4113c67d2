//! Coordinate type definitions

use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Scale factor for cache-key rounding: 1e-4 degrees (~11 m at the
/// equator), smaller than any boundary feature the datasets carry.
pub const KEY_SCALE: f64 = 10_000.0;

/// Errors that can occur during coordinate validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside valid range (-90.0 to 90.0)
    #[error("Invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    #[error("Invalid longitude: {0} (must be between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),
}

/// A validated geographic coordinate in decimal degrees.
///
/// Construction via [`Coordinate::new`] guarantees both components are
/// finite and in range, so downstream lookups never re-validate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] if either component is non-finite or out
    /// of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in decimal degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Round to the fixed cache-key precision.
    #[inline]
    pub fn key(&self) -> CoordKey {
        CoordKey {
            lat_e4: (self.lat * KEY_SCALE).round() as i32,
            lon_e4: (self.lon * KEY_SCALE).round() as i32,
        }
    }
}

/// A coordinate rounded to 1e-4 degrees, usable as a hash-map key.
///
/// Stored as scaled integers so equality and hashing are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    /// Latitude in 1e-4 degree units
    pub lat_e4: i32,
    /// Longitude in 1e-4 degree units
    pub lon_e4: i32,
}
