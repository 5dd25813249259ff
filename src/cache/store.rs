//! Cache Store Module
//!
//! TTL-keyed storage for response payloads with lazy expiry and hit/miss
//! counters. Pure data structure: no I/O, no locking of its own.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Cache Store ==
/// In-memory response store keyed by request path.
///
/// A stale entry may still be physically present until the sweep runs, but
/// `get` re-checks staleness and never returns it.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Process-lifetime counters
    stats: CacheStats,
    /// TTL in seconds applied when `set` gets no explicit TTL
    default_ttl: u64,
    /// Time source for insertion and staleness checks
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore on the system clock.
    ///
    /// # Arguments
    /// * `default_ttl` - Default TTL in seconds for entries without explicit TTL
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            default_ttl,
            clock,
        }
    }

    /// Default TTL in seconds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Every call counts exactly once: a hit for a live entry, a miss for an
    /// absent or stale one. Stale entries are dropped on the way out.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_stale_at(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        };
        self.stats.record_lookup(value.is_some());
        value
    }

    // == Contains Live ==
    /// Whether `key` holds a live entry. Not a lookup: counters are left
    /// alone and stale entries stay in place.
    pub fn contains_live(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_stale_at(now))
    }

    // == Set ==
    /// Stores or fully replaces the entry for `key`, inserted now.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - Any JSON payload
    /// * `ttl` - TTL in seconds (uses the default TTL if None)
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<u64>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl, self.clock.now_ms());
        self.entries.insert(key.into(), entry);
    }

    // == Delete ==
    /// Removes exactly the given keys; absent keys are ignored.
    ///
    /// Returns the number of entries actually removed.
    pub fn delete<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .filter(|key| self.entries.remove(key.as_ref()).is_some())
            .count()
    }

    // == Keys ==
    /// Returns every stored key, including stale entries the sweep has not
    /// reclaimed yet.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Flush All ==
    /// Removes every entry. Hit/miss counters are left untouched.
    pub fn flush_all(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.with_key_count(self.entries.len())
    }

    // == Sweep Expired ==
    /// Physically removes all stale entries.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the number of physically stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
