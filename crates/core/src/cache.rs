//! Bounded in-memory cache with time-to-live expiry
//!
//! Entries expire `ttl` after insertion and are checked on read. When the
//! cache grows past `max_entries` the oldest-inserted entry is evicted.
//! Re-inserting a key refreshes both its timestamp and its position.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tablemate_core::cache::{CacheConfig, TtlCache};
//!
//! let mut cache = TtlCache::new(CacheConfig::new(Duration::from_secs(300), 50));
//! cache.insert("치킨".to_string(), vec![1, 2, 3]);
//!
//! assert_eq!(cache.get("치킨"), Some(&vec![1, 2, 3]));
//! ```
//!
//! Every time-dependent method has an `_at` variant taking the current
//! [`Instant`] so callers can drive the clock explicitly.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for every entry
    pub ttl: Duration,
    /// Maximum number of live entries (0 = unlimited)
    pub max_entries: usize,
}

impl CacheConfig {
    /// Create a configuration
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self { ttl, max_entries }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 50,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL cache with insertion-order eviction
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    config: CacheConfig,
    entries: HashMap<K, CacheEntry<V>>,
    order: VecDeque<K>,
    hits: u64,
    misses: u64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a live entry
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    /// Look up a live entry as of `now`. Expired entries are dropped.
    pub fn get_at<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.entries.get(key) {
            None => {
                self.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            self.remove(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.entries.get(key).map(|e| &e.value)
    }

    /// Insert or refresh an entry
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert or refresh an entry with an explicit timestamp
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, CacheEntry { value, inserted_at: now });

        if self.config.max_entries > 0 {
            while self.entries.len() > self.config.max_entries {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    /// Remove an entry, returning its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| <K as Borrow<Q>>::borrow(k) != key);
        Some(entry.value)
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.config.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of stored entries, including any not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.config.ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored
    pub entries: usize,
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
}
