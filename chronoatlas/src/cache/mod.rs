//! Coordinate Lookup Cache.
//!
//! A bounded memo of coordinate-to-zone lookups shared across requests.
//! Keys are coordinates rounded to 1e-4 degrees (see
//! [`crate::coord::CoordKey`]), trading a small accuracy risk right at
//! zone boundaries for a large hit-rate gain.
//!
//! The cache is a pure performance optimization: swapping
//! [`LruZoneCache`] for [`NoOpZoneCache`] must not change any field of
//! any result, only latency. The trait exists so tests and the service
//! composition can inject either.

mod memory;
mod stats;

pub use memory::LruZoneCache;
pub use stats::CacheStats;

use crate::coord::{CoordKey, Coordinate};

/// A cached coordinate-to-zone outcome.
///
/// Carries the full lookup provenance, not just the zone id, so a cache
/// hit reproduces the same notes and confidence as the original miss.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLookup {
    pub zone_id: String,
    pub via: LookupVia,
}

/// Which index produced a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupVia {
    /// Polygon membership in the boundary index.
    Boundary,
    /// Nearest-settlement fallback; name and distance feed the result's
    /// audit notes.
    Settlement { name: String, distance_km: f64 },
}

/// Cache abstraction for coordinate-to-zone lookups.
pub trait ZoneCache: Send + Sync {
    /// Get the cached lookup for a rounded coordinate, if present.
    fn get(&self, key: &CoordKey) -> Option<ZoneLookup>;

    /// Store a lookup outcome.
    fn put(&self, key: CoordKey, value: ZoneLookup);

    /// Drop all entries.
    fn clear(&self);

    /// Snapshot of hit/miss/eviction counters.
    fn stats(&self) -> CacheStats;
}

/// No-op cache that never stores anything.
///
/// Every `get` is a miss; used to verify cache transparency and for
/// deployments that prefer recomputation over memory.
#[derive(Debug, Default)]
pub struct NoOpZoneCache;

impl ZoneCache for NoOpZoneCache {
    fn get(&self, _key: &CoordKey) -> Option<ZoneLookup> {
        None
    }

    fn put(&self, _key: CoordKey, _value: ZoneLookup) {}

    fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats::new()
    }
}

/// Look up through the cache, computing and storing on a miss.
///
/// The compute closure runs outside any cache lock.
pub fn get_or_compute<E>(
    cache: &dyn ZoneCache,
    coord: &Coordinate,
    compute: impl FnOnce() -> Result<ZoneLookup, E>,
) -> Result<ZoneLookup, E> {
    let key = coord.key();
    if let Some(hit) = cache.get(&key) {
        return Ok(hit);
    }
    let value = compute()?;
    cache.put(key, value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(zone: &str) -> ZoneLookup {
        ZoneLookup {
            zone_id: zone.to_string(),
            via: LookupVia::Boundary,
        }
    }

    #[test]
    fn test_noop_cache_never_stores() {
        let cache = NoOpZoneCache;
        let coord = Coordinate::new(52.37, 4.90).unwrap();
        cache.put(coord.key(), lookup("Europe/Amsterdam"));
        assert!(cache.get(&coord.key()).is_none());
    }

    #[test]
    fn test_get_or_compute_caches_result() {
        let cache = LruZoneCache::new(4);
        let coord = Coordinate::new(52.37, 4.90).unwrap();

        let mut calls = 0;
        for _ in 0..3 {
            let result: Result<ZoneLookup, std::convert::Infallible> =
                get_or_compute(&cache, &coord, || {
                    calls += 1;
                    Ok(lookup("Europe/Amsterdam"))
                });
            assert_eq!(result.unwrap().zone_id, "Europe/Amsterdam");
        }
        assert_eq!(calls, 1, "compute must run only on the first miss");
    }

    #[test]
    fn test_get_or_compute_propagates_errors_without_caching() {
        let cache = LruZoneCache::new(4);
        let coord = Coordinate::new(52.37, 4.90).unwrap();

        let result: Result<ZoneLookup, &str> = get_or_compute(&cache, &coord, || Err("boom"));
        assert!(result.is_err());

        // The failure was not cached
        let result: Result<ZoneLookup, &str> =
            get_or_compute(&cache, &coord, || Ok(lookup("Europe/Amsterdam")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_nearby_coordinates_share_a_cell() {
        let cache = LruZoneCache::new(4);
        let a = Coordinate::new(52.370001, 4.900002).unwrap();
        let b = Coordinate::new(52.370040, 4.899961).unwrap();

        let _: Result<ZoneLookup, std::convert::Infallible> =
            get_or_compute(&cache, &a, || Ok(lookup("Europe/Amsterdam")));
        let result: Result<ZoneLookup, &str> =
            get_or_compute(&cache, &b, || Err("should have been a hit"));
        assert!(result.is_ok());
    }
}
