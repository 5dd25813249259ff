//! Expiry Sweep Task
//!
//! Background task that periodically removes stale cache entries. Reads
//! never depend on it: the store re-checks staleness on every `get`, so a
//! late or skipped sweep only delays memory reclamation.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a task that sweeps stale entries every `interval_secs` seconds.
///
/// The sweep takes the store's write lock only for the duration of one
/// pass, so it interleaves with request traffic between whole operations.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = cache::shared(CacheStore::new(300));
/// let sweep_handle = spawn_sweep_task(store.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: SharedStore, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.sweep_expired();

            if removed > 0 {
                info!("Cache sweep: removed {} stale entries", removed);
            } else {
                debug!("Cache sweep: no stale entries found");
            }
        }
    })
}
