//! Sheets Proxy - REST API over a spreadsheet with an in-memory response cache
//!
//! Exposes spreadsheet ranges and metadata as JSON endpoints and caches
//! successful responses with TTL expiry to spare the upstream.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod sheets;
pub mod tasks;

pub use api::{AppState, KeyPolicy, ResponseCache};
pub use config::Config;
pub use tasks::spawn_sweep_task;
