//! Lookup counters for the response cache.

use serde::Serialize;

// == Cache Stats ==
/// Counters plus the live key count, as reported by `CacheStore::stats`.
///
/// `hits` and `misses` are cumulative for the process; flushing the store
/// leaves them as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Keys currently held, stale-but-unswept included
    pub key_count: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    // == Record Lookup ==
    /// Counts one `get`: a hit when it returned a live value.
    ///
    /// # Arguments
    /// * `hit` - Whether the lookup returned a live value
    pub fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Fraction of lookups that hit, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    // == Key Count ==
    /// Copy of the counters carrying `key_count`.
    pub fn with_key_count(&self, key_count: usize) -> Self {
        Self {
            key_count,
            ..self.clone()
        }
    }
}
