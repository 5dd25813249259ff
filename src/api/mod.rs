//! API Module
//!
//! HTTP handlers, routing and the response cache middleware.
//!
//! # Endpoints
//! - `GET /` - Health check
//! - `GET /api/sheets/{validate,data,available,financial-config}` - Spreadsheet data
//! - `GET /api/cache/stats` - Cache statistics
//! - `POST /api/cache/clear` - Cache invalidation

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{response_cache, KeyPolicy, ResponseCache};
pub use routes::create_router;
