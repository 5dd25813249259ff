//! Cache Module
//!
//! In-memory response cache with TTL expiry, admin controls and opt-in
//! single-flight coalescing.

mod admin;
mod clock;
mod entry;
mod flight;
mod memory;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use admin::{AdminStats, CacheAdmin, ClearOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use flight::{Flight, FlightGroup, FlightGuard, FlightWaiter};
pub use memory::ProcessMemory;
pub use stats::CacheStats;
pub use store::CacheStore;

/// The single process-wide store, shared by the middleware, the admin
/// surface and the sweep task.
pub type SharedStore = Arc<RwLock<CacheStore>>;

/// Wraps a store for sharing.
pub fn shared(store: CacheStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}
