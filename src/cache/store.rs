// In-memory response cache with TTL expiry and LRU eviction.
// Entries are ordered by recency so eviction and snapshots are deterministic.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default TTL applied to every entry: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 500;

/// A cached value with its timing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub value: V,
    /// When the value was inserted.
    pub cached_at: DateTime<Utc>,
    /// When the value stops being served.
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            value,
            cached_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Check if this entry has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// One entry of a persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry<V> {
    pub key: String,
    #[serde(flatten)]
    pub entry: CacheEntry<V>,
}

/// Bounded key/value store with per-entry TTL and LRU eviction.
#[derive(Debug)]
pub struct CacheStore<V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency order: front is least recently used.
    order: VecDeque<String>,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl<V> CacheStore<V> {
    /// Create an empty store. A zero capacity is treated as one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including ones that expired but were not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a fresh value and mark it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_at(key, Utc::now())
    }

    /// Get a fresh value as of `now`. Expired entries are dropped on the spot.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<&V> {
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            debug!(key, "cache entry expired");
            self.remove(key);
            return None;
        }

        self.touch(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Check for a fresh entry without changing recency.
    pub fn has(&self, key: &str) -> bool {
        self.has_at(key, Utc::now())
    }

    pub fn has_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Insert or replace a value, stamping a new expiry.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Utc::now());
    }

    pub fn set_at(&mut self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        let key = key.into();
        let entry = CacheEntry::new(value, now, self.ttl);

        if self.entries.insert(key.clone(), entry).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key);

        self.evict_overflow();
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Move a key to the most recently used end.
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!(key = %oldest, "evicting least recently used cache entry");
            self.entries.remove(&oldest);
        }
    }
}

impl<V: Clone> CacheStore<V> {
    /// All entries, least recently used first.
    pub fn snapshot(&self) -> Vec<SnapshotEntry<V>> {
        self.order
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| SnapshotEntry {
                    key: key.clone(),
                    entry: entry.clone(),
                })
            })
            .collect()
    }

    /// Replace the contents with a snapshot.
    pub fn load(&mut self, snapshot: Vec<SnapshotEntry<V>>) {
        self.load_at(snapshot, Utc::now());
    }

    /// Replace the contents with a snapshot as of `now`.
    ///
    /// Expiry stays anchored to each entry's original insertion, so entries
    /// that went stale while on disk are skipped. Recency order follows the
    /// snapshot order and only the most recent `capacity` entries survive.
    pub fn load_at(&mut self, snapshot: Vec<SnapshotEntry<V>>, now: DateTime<Utc>) {
        self.clear();

        for SnapshotEntry { key, entry } in snapshot {
            if entry.is_expired_at(now) {
                continue;
            }
            if self.entries.insert(key.clone(), entry).is_some() {
                self.order.retain(|k| k != &key);
            }
            self.order.push_back(key);
        }

        self.evict_overflow();
    }
}
