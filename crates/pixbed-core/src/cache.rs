//! Bounded in-process TTL cache
//!
//! A capacity-bounded map whose entries expire independently after a fixed
//! time to live. The clock is injectable so expiry is deterministic in tests.
//! The cache is a latency optimization only; nothing may rely on it for
//! correctness, and the system must behave identically with it disabled.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current time. Injected so tests can advance time manually.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed [`Clock`], used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Capacity-bounded TTL map. Least-recently-used entries are evicted when the
/// capacity is reached; expired entries are dropped on access.
pub struct TtlCache<K: Hash + Eq, V: Clone> {
    inner: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// A capacity of zero is treated as one; the cache is always bounded.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        TtlCache {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    /// Look up a live entry. Expired entries are removed and reported absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let live = match inner.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };
        if live.is_none() {
            inner.pop(key);
        }
        live
    }

    /// Insert or replace an entry, resetting its time to live.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.put(key, Entry { value, expires_at });
    }

    /// Drop an entry, returning its value if it was still live.
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner
            .pop(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value)
    }

    /// Number of entries currently held (live or not yet collected).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
