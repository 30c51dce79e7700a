//! Bounded in-memory cache with per-entry time-to-live.
//!
//! Entries expire lazily: staleness is only detected when that exact key is
//! looked up, and only that key is evicted. Capacity is enforced separately
//! by least-recently-used eviction via [`lru`].

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

/// Source of the current instant, injectable so expiry can be tested
/// without sleeping.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.origin + *offset
    }
}

/// Canonical key for a memoized call.
///
/// Positional arguments keep their order; keyword arguments are sorted by
/// name, so the order in which they were supplied does not matter. Values
/// are rendered with their `Debug` form, which keeps `"5"` and `5` apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    positional: Vec<String>,
    keyword: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl fmt::Debug) -> Self {
        self.positional.push(format!("{value:?}"));
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl fmt::Debug) -> Self {
        self.keyword.insert(name.into(), format!("{value:?}"));
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .positional
            .iter()
            .cloned()
            .chain(self.keyword.iter().map(|(k, v)| format!("{k}={v}")))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because they outlived the TTL
    pub expired: u64,
    /// Entries dropped to make room under the capacity bound
    pub evicted: u64,
    pub entries: usize,
    pub capacity: usize,
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    evicted: AtomicU64,
}

/// Memoizing store: values are fresh while `age <= ttl` and never served
/// once stale.
pub struct TtlCache<K, V> {
    store: Mutex<LruCache<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// A `max_entries` of zero is treated as one.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
            counters: Counters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn store(&self) -> MutexGuard<'_, LruCache<K, CacheEntry<V>>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the fresh value for `key`, evicting it if it has gone stale.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut store = self.store();

        let fresh = match store.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) <= self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                store.pop(key);
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => None,
        };

        match fresh {
            Some(_) => self.counters.hits.fetch_add(1, Ordering::Relaxed),
            None => self.counters.misses.fetch_add(1, Ordering::Relaxed),
        };
        fresh
    }

    /// Store `value` under `key`, stamped with the current instant.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        let mut store = self.store();
        let replaces_existing = store.contains(&key);
        if store.push(key, entry).is_some() && !replaces_existing {
            self.counters.evicted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return the cached value for `key`, or run `produce` and cache its
    /// output. A failing producer is not cached and its error is returned
    /// unchanged.
    ///
    /// The store is not locked while `produce` runs, so concurrent misses on
    /// the same key may each run the producer; the last one to finish wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, produce: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = produce().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop `key`, returning whether it was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.store().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.store().clear();
    }

    pub fn len(&self) -> usize {
        self.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let store = self.store();
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
            entries: store.len(),
            capacity: store.cap().get(),
        }
    }
}
