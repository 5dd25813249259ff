//! Cache Entry Module
//!
//! Defines the structure for individual cached responses with TTL support.

use serde_json::Value;

// == Cache Entry ==
/// A single cached response payload with its insertion metadata.
///
/// Entries are never mutated in place; a `set` on an existing key replaces
/// the whole entry. The key itself lives only in the store's map.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored JSON payload
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// TTL the entry was stored with, 0 = never expires
    pub ttl_seconds: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_seconds` - TTL in seconds, 0 disables expiry
    /// * `now_ms` - Insertion time in Unix milliseconds
    pub fn new(value: Value, ttl_seconds: u64, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            ttl_seconds,
        }
    }

    // == Expires At ==
    /// Expiration timestamp (Unix milliseconds), None = no expiration.
    pub fn expires_at(&self) -> Option<u64> {
        if self.ttl_seconds == 0 {
            None
        } else {
            Some(
                self.inserted_at
                    .saturating_add(self.ttl_seconds.saturating_mul(1000)),
            )
        }
    }

    // == Is Stale ==
    /// Checks if the entry's TTL has elapsed at `now_ms`.
    ///
    /// Boundary condition: an entry is stale once the current time is greater
    /// than or equal to its expiration time.
    pub fn is_stale_at(&self, now_ms: u64) -> bool {
        match self.expires_at() {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }
}
