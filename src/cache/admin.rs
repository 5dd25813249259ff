//! Cache Admin Module
//!
//! Operational view of the shared store: stats and manual invalidation.
//! Runs outside the request path and never touches hit/miss counters.

use serde::Serialize;
use tracing::info;

use crate::cache::{ProcessMemory, SharedStore};

// == Clear Outcome ==
/// Result of a [`CacheAdmin::clear`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClearOutcome {
    /// Keys containing the pattern were removed
    Pattern { count: usize },
    /// Every entry was removed
    All,
}

// == Admin Stats ==
/// Stats exposed to operators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub key_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    /// Whole-process memory, not cache size
    pub process_memory: ProcessMemory,
}

// == Cache Admin ==
#[derive(Debug, Clone)]
pub struct CacheAdmin {
    store: SharedStore,
}

impl CacheAdmin {
    // == Constructor ==
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // == Stats ==
    /// Returns counters, key count and a process memory snapshot.
    pub async fn stats(&self) -> AdminStats {
        let stats = self.store.read().await.stats();

        AdminStats {
            key_count: stats.key_count,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            process_memory: ProcessMemory::snapshot(),
        }
    }

    // == Clear ==
    /// Removes every key containing `pattern` (case-sensitive substring), or
    /// every key when no pattern is given.
    ///
    /// # Arguments
    /// * `pattern` - Substring to match, `None` for a full flush
    ///
    /// An empty pattern is a substring of every key and so removes them all,
    /// but is still reported as a pattern clear.
    pub async fn clear(&self, pattern: Option<&str>) -> ClearOutcome {
        let mut store = self.store.write().await;

        match pattern {
            Some(pattern) => {
                let matching: Vec<String> = store
                    .keys()
                    .into_iter()
                    .filter(|key| key.contains(pattern))
                    .collect();
                let count = store.delete(&matching);
                info!("Cache cleared for pattern '{}' ({} entries)", pattern, count);
                ClearOutcome::Pattern { count }
            }
            None => {
                store.flush_all();
                info!("Cache cleared completely");
                ClearOutcome::All
            }
        }
    }
}
