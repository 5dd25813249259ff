//! In-flight request tracking for opt-in single-flight coalescing.
//!
//! The first caller to [`FlightGroup::join`] a key becomes the leader and
//! holds a [`FlightGuard`]. Later callers for the same key get a
//! [`FlightWaiter`] that resolves once the guard is dropped, whether the
//! leader finished, failed, or was cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

// == Flight Group ==
/// Registry of keys that currently have a leader running downstream.
#[derive(Debug, Default)]
pub struct FlightGroup {
    inflight: Mutex<HashMap<String, watch::Receiver<()>>>,
}

// == Flight ==
/// Role assigned to a caller by [`FlightGroup::join`].
#[derive(Debug)]
pub enum Flight {
    /// No one else is working on this key; run the handler.
    Leader(FlightGuard),
    /// Another caller is already working on this key; wait for it.
    Follower(FlightWaiter),
}

impl FlightGroup {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Join ==
    /// Registers interest in `key`.
    ///
    /// # Arguments
    /// * `key` - Cache key the caller missed on
    ///
    /// # Returns
    /// - `Flight::Leader` if no flight is running for `key`
    /// - `Flight::Follower` waiting on the running flight otherwise
    pub fn join(self: &Arc<Self>, key: &str) -> Flight {
        let mut inflight = self.inflight.lock();

        if let Some(done) = inflight.get(key) {
            return Flight::Follower(FlightWaiter { done: done.clone() });
        }

        let (tx, rx) = watch::channel(());
        inflight.insert(key.to_string(), rx);
        Flight::Leader(FlightGuard {
            group: Arc::clone(self),
            key: key.to_string(),
            _done: tx,
        })
    }
}

// == Flight Guard ==
/// Held by the leader for the duration of its downstream call.
///
/// Dropping it unregisters the key and wakes every follower.
#[derive(Debug)]
pub struct FlightGuard {
    group: Arc<FlightGroup>,
    key: String,
    _done: watch::Sender<()>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        // Unregister before the sender drops so woken followers that miss
        // the store can lead a fresh flight.
        self.group.inflight.lock().remove(&self.key);
    }
}

// == Flight Waiter ==
/// Held by followers; completes when the leader's guard is dropped.
#[derive(Debug)]
pub struct FlightWaiter {
    done: watch::Receiver<()>,
}

impl FlightWaiter {
    pub async fn wait(mut self) {
        // The leader never sends; `changed` errors out once the sender drops.
        while self.done.changed().await.is_ok() {}
    }
}
