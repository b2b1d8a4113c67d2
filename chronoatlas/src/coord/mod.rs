//! Coordinate validation and great-circle distance.
//!
//! Provides the validated [`Coordinate`] value type shared by the
//! boundary index, the settlement fallback index, and the lookup cache,
//! plus the haversine distance used to report fallback match quality.

mod types;

pub use types::{Coordinate, CoordError, CoordKey, KEY_SCALE, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two coordinates in kilometres.
///
/// Haversine formulation; accurate to well under a percent, which is
/// more than enough for reporting how far a fallback settlement sits
/// from the queried point.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = Coordinate::new(52.37, 4.89).unwrap();
        assert_eq!(c.lat(), 52.37);
        assert_eq!(c.lon(), 4.89);
    }

    #[test]
    fn test_poles_and_antimeridian_are_valid() {
        assert!(Coordinate::new(90.0, 0.0).is_ok());
        assert!(Coordinate::new(-90.0, 0.0).is_ok());
        assert!(Coordinate::new(0.0, 180.0).is_ok());
        assert!(Coordinate::new(0.0, -180.0).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        let result = Coordinate::new(90.1, 0.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = Coordinate::new(0.0, -180.5);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_key_rounding() {
        let a = Coordinate::new(52.37001, 4.89002).unwrap();
        let b = Coordinate::new(52.37004, 4.88998).unwrap();
        // Both round to the same 1e-4 degree cell
        assert_eq!(a.key(), b.key());

        let c = Coordinate::new(52.3710, 4.8900).unwrap();
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_key_is_exact_integer_representation() {
        let c = Coordinate::new(-33.8688, 151.2093).unwrap();
        let key = c.key();
        assert_eq!(key.lat_e4, -338688);
        assert_eq!(key.lon_e4, 1512093);
    }

    #[test]
    fn test_haversine_amsterdam_london() {
        let amsterdam = Coordinate::new(52.3676, 4.9041).unwrap();
        let london = Coordinate::new(51.5074, -0.1278).unwrap();
        let d = haversine_km(&amsterdam, &london);
        // Known distance is ~358 km
        assert!((d - 358.0).abs() < 5.0, "distance was {d}");
    }

    #[test]
    fn test_haversine_zero_distance() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        assert!(haversine_km(&c, &c) < 1e-9);
    }
}
