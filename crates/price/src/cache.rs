//! Time-bounded memoization of exchange-rate lookups

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Cache key: canonical (asset, fiat) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub asset: String,
    pub fiat: String,
}

impl PriceKey {
    pub fn new(asset: impl Into<String>, fiat: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            fiat: fiat.into(),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

struct CacheInner<V> {
    entries: HashMap<PriceKey, CacheEntry<V>>,
    insertion_order: VecDeque<PriceKey>,
}

/// Capacity- and TTL-bounded store.
///
/// `get` returns absent both when a key was never inserted and when its entry
/// has outlived the TTL; callers cannot distinguish the two and refetch
/// identically either way. Inserting a new key at capacity evicts the
/// least-recently-inserted key. A single mutex guards the map and the
/// insertion-order queue.
pub struct PriceCache<V> {
    inner: Mutex<CacheInner<V>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> PriceCache<V> {
    /// Create a cache with the given entry lifetime and capacity
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            ttl,
            capacity,
        }
    }

    /// Look up a fresh entry. Expired entries are treated as absent.
    pub fn get(&self, key: &PriceKey) -> Option<V> {
        let inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Record a value with the current timestamp.
    ///
    /// Re-inserting an existing key refreshes its timestamp in place; only a
    /// new key can trigger eviction.
    pub fn put(&self, key: PriceKey, value: V) {
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(&key) {
            if inner.entries.len() >= self.capacity {
                while let Some(oldest) = inner.insertion_order.pop_front() {
                    if inner.entries.remove(&oldest).is_some() {
                        break;
                    }
                }
            }
            inner.insertion_order.push_back(key.clone());
        }
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, fresh or expired
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = PriceCache::new(Duration::from_secs(300), 100);
        cache.put(PriceKey::new("BTC", "USD"), 65000.0_f64);
        assert_eq!(cache.get(&PriceKey::new("BTC", "USD")), Some(65000.0));
    }

    #[test]
    fn test_never_inserted_is_absent() {
        let cache: PriceCache<f64> = PriceCache::new(Duration::from_secs(300), 100);
        assert_eq!(cache.get(&PriceKey::new("ETH", "EUR")), None);
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache = PriceCache::new(Duration::from_millis(10), 100);
        cache.put(PriceKey::new("BTC", "USD"), 65000.0_f64);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&PriceKey::new("BTC", "USD")), None);
    }

    #[test]
    fn test_capacity_evicts_oldest_insert() {
        let cache = PriceCache::new(Duration::from_secs(300), 2);
        cache.put(PriceKey::new("BTC", "USD"), 1.0_f64);
        cache.put(PriceKey::new("ETH", "USD"), 2.0_f64);
        cache.put(PriceKey::new("LTC", "USD"), 3.0_f64);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&PriceKey::new("BTC", "USD")), None);
        assert_eq!(cache.get(&PriceKey::new("ETH", "USD")), Some(2.0));
        assert_eq!(cache.get(&PriceKey::new("LTC", "USD")), Some(3.0));
    }

    #[test]
    fn test_reinsert_refreshes_without_eviction() {
        let cache = PriceCache::new(Duration::from_secs(300), 2);
        cache.put(PriceKey::new("BTC", "USD"), 1.0_f64);
        cache.put(PriceKey::new("ETH", "USD"), 2.0_f64);
        cache.put(PriceKey::new("BTC", "USD"), 9.0_f64);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&PriceKey::new("BTC", "USD")), Some(9.0));
        assert_eq!(cache.get(&PriceKey::new("ETH", "USD")), Some(2.0));
    }
}
