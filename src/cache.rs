//! In-memory result cache with a fixed TTL and an injectable clock
//!
//! Entries are invalidated lazily: an expired entry is dropped the next time
//! its key is read, never swept in the background. Writers racing on the
//! same key resolve last-writer-wins.

use crate::models::Coordinate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Time source for cache expiry decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time source used outside of tests
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually-driven clock for expiry tests
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(now: SystemTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().expect("clock lock poisoned")
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    name: String,
    cached_at: SystemTime,
    expires_at: SystemTime,
}

/// Result cache keyed by rounded coordinate strings
pub struct LocationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl LocationCache {
    /// Create a cache backed by the system clock
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Retrieve a value if it exists and has not expired.
    /// Expired entries are removed on read and `None` is returned.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                let age = now
                    .duration_since(entry.cached_at)
                    .unwrap_or_default()
                    .as_secs();
                tracing::debug!(key, age_secs = age, "cache hit, entry still fresh");
                Some(entry.name.clone())
            }
            Some(_) => {
                tracing::debug!(key, "cache hit but entry expired, dropping");
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!(key, "cache miss");
                None
            }
        }
    }

    /// Store a resolved name. An existing entry for the key is overwritten.
    pub fn insert(&self, key: &str, name: &str) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                name: name.to_string(),
                cached_at: now,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let count = entries.len();
        entries.clear();
        count
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split a coordinate list into already-cached results and the
    /// coordinates that still need a network lookup. Duplicate keys are
    /// deduplicated on the uncached side.
    pub fn partition(
        &self,
        coordinates: &[Coordinate],
    ) -> (Vec<(Coordinate, String)>, Vec<Coordinate>) {
        let mut cached = Vec::new();
        let mut missing = Vec::new();
        let mut seen = HashSet::new();

        for coordinate in coordinates {
            let key = coordinate.cache_key();
            if let Some(name) = self.get(&key) {
                cached.push((*coordinate, name));
            } else if seen.insert(key) {
                missing.push(*coordinate);
            }
        }

        (cached, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn manual_cache() -> (Arc<ManualClock>, LocationCache) {
        let clock = Arc::new(ManualClock::starting_at(UNIX_EPOCH));
        let cache = LocationCache::with_clock(WEEK, Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, cache)
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let (clock, cache) = manual_cache();
        cache.insert("4.050300,9.767900", "Akwa, Douala");

        clock.advance(Duration::from_secs(3600));
        assert_eq!(
            cache.get("4.050300,9.767900"),
            Some("Akwa, Douala".to_string())
        );
    }

    #[test]
    fn test_expired_entry_is_dropped_on_read() {
        let (clock, cache) = manual_cache();
        cache.insert("4.050300,9.767900", "Akwa, Douala");

        clock.advance(WEEK);
        assert_eq!(cache.get("4.050300,9.767900"), None);
        // Removed, not just hidden
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let (_clock, cache) = manual_cache();
        cache.insert("k", "first");
        cache.insert("k", "second");
        assert_eq!(cache.get("k"), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_reports_count() {
        let (_clock, cache) = manual_cache();
        cache.insert("a", "1");
        cache.insert("b", "2");
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_partition_splits_and_dedupes() {
        let (_clock, cache) = manual_cache();
        let known = Coordinate::new(4.0503, 9.7679).unwrap();
        let unknown = Coordinate::new(3.8667, 11.5167).unwrap();
        cache.insert(&known.cache_key(), "Akwa, Douala");

        let (cached, missing) = cache.partition(&[known, unknown, unknown]);
        assert_eq!(cached, vec![(known, "Akwa, Douala".to_string())]);
        assert_eq!(missing, vec![unknown]);
    }
}
