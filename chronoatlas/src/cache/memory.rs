//! Bounded in-memory cache with LRU eviction.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use super::stats::CacheStats;
use super::{ZoneCache, ZoneLookup};
use crate::coord::CoordKey;

/// Entry in the lookup cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: ZoneLookup,
    /// Last access time for LRU eviction.
    last_accessed: Instant,
}

/// Bounded coordinate-to-zone memo with least-recently-used eviction.
///
/// The only mutable shared state in the resolution core. Interior
/// mutability keeps `get`/`put` usable through `&self` from concurrent
/// request handlers; the two locks are held only for the duration of a
/// map operation, never across a lookup computation.
pub struct LruZoneCache {
    entries: Mutex<HashMap<CoordKey, CacheEntry>>,
    stats: Mutex<CacheStats>,
    /// Maximum number of entries.
    capacity: usize,
}

impl LruZoneCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is coerced to one so `put` always makes
    /// progress.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::new()),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Evict least-recently-used entries until there is room for one
    /// more. Caller holds the entries lock.
    fn evict_for_insert(
        &self,
        entries: &mut HashMap<CoordKey, CacheEntry>,
        stats: &mut CacheStats,
    ) {
        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    stats.record_eviction();
                }
                None => break,
            }
        }
    }
}

impl ZoneCache for LruZoneCache {
    fn get(&self, key: &CoordKey) -> Option<ZoneLookup> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let mut stats = self.stats.lock().expect("cache stats lock poisoned");

        if let Some(entry) = entries.get_mut(key) {
            entry.last_accessed = Instant::now();
            stats.record_hit();
            Some(entry.value.clone())
        } else {
            stats.record_miss();
            None
        }
    }

    fn put(&self, key: CoordKey, value: ZoneLookup) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let mut stats = self.stats.lock().expect("cache stats lock poisoned");

        if !entries.contains_key(&key) {
            self.evict_for_insert(&mut entries, &mut stats);
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                last_accessed: Instant::now(),
            },
        );
        stats.entries = entries.len();
    }

    fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let mut stats = self.stats.lock().expect("cache stats lock poisoned");
        entries.clear();
        stats.entries = 0;
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().expect("cache stats lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LookupVia;
    use crate::coord::Coordinate;

    fn key(lat: f64, lon: f64) -> CoordKey {
        Coordinate::new(lat, lon).unwrap().key()
    }

    fn lookup(zone: &str) -> ZoneLookup {
        ZoneLookup {
            zone_id: zone.to_string(),
            via: LookupVia::Boundary,
        }
    }

    #[test]
    fn test_put_and_get() {
        let cache = LruZoneCache::new(4);
        cache.put(key(52.37, 4.90), lookup("Europe/Amsterdam"));

        let hit = cache.get(&key(52.37, 4.90)).unwrap();
        assert_eq!(hit.zone_id, "Europe/Amsterdam");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_miss_recorded() {
        let cache = LruZoneCache::new(4);
        assert!(cache.get(&key(0.0, 0.0)).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = LruZoneCache::new(2);
        cache.put(key(1.0, 1.0), lookup("Europe/London"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        cache.put(key(2.0, 2.0), lookup("Europe/Paris"));
        std::thread::sleep(std::time::Duration::from_millis(2));

        // Touch the first entry so the second becomes LRU
        cache.get(&key(1.0, 1.0));
        std::thread::sleep(std::time::Duration::from_millis(2));

        cache.put(key(3.0, 3.0), lookup("Europe/Berlin"));

        assert!(cache.get(&key(1.0, 1.0)).is_some());
        assert!(cache.get(&key(2.0, 2.0)).is_none(), "LRU entry not evicted");
        assert!(cache.get(&key(3.0, 3.0)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_capacity_bound_holds() {
        let cache = LruZoneCache::new(8);
        for i in 0..100 {
            cache.put(key(i as f64 * 0.5, 0.0), lookup("Europe/London"));
        }
        assert!(cache.stats().entries <= 8);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = LruZoneCache::new(1);
        cache.put(key(1.0, 1.0), lookup("Europe/London"));
        cache.put(key(1.0, 1.0), lookup("Europe/Paris"));
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get(&key(1.0, 1.0)).unwrap().zone_id, "Europe/Paris");
    }

    #[test]
    fn test_clear() {
        let cache = LruZoneCache::new(4);
        cache.put(key(1.0, 1.0), lookup("Europe/London"));
        cache.clear();
        assert!(cache.get(&key(1.0, 1.0)).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_capacity_coerced() {
        let cache = LruZoneCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(key(1.0, 1.0), lookup("Europe/London"));
        assert!(cache.get(&key(1.0, 1.0)).is_some());
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;

        let cache = Arc::new(LruZoneCache::new(64));
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    let k = key(((t * 7 + i) % 80) as f64, 10.0);
                    if cache.get(&k).is_none() {
                        cache.put(k, lookup("Europe/London"));
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.stats().entries <= 64);
    }
}
