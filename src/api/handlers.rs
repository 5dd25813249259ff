//! API Handlers
//!
//! HTTP request handlers for the spreadsheet endpoints and the cache admin
//! surface.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Query, State},
    Json,
};

use crate::api::ResponseCache;
use crate::cache::{self, CacheAdmin, CacheStore, SharedStore};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    ClearRequest, ClearResponse, DataQuery, HealthResponse, ScenarioQuery,
    StatsResponse,
};
use crate::sheets::{
    AvailableSheets, ConnectionInfo, FinancialConfig, SheetData, SheetSource, SheetsService,
};

/// Application state shared across all handlers.
///
/// Holds the one process-wide cache store, reached through the middleware
/// (`cache`) and the admin surface (`admin`).
#[derive(Clone)]
pub struct AppState {
    pub cache: ResponseCache,
    pub admin: CacheAdmin,
    pub sheets: SheetsService,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around an existing store.
    pub fn new(store: SharedStore, source: Arc<dyn SheetSource>) -> Self {
        Self {
            cache: ResponseCache::new(store.clone()),
            admin: CacheAdmin::new(store),
            sheets: SheetsService::new(source),
            environment: "development".to_string(),
            allowed_origins: Config::default().allowed_origins(),
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the store with the configured default TTL and applies the key
    /// policy and single-flight settings to the middleware.
    pub fn from_config(config: &Config, source: Arc<dyn SheetSource>) -> Self {
        let store = cache::shared(CacheStore::new(config.default_ttl));
        let mut state = Self::new(store, source);

        state.cache = state.cache.with_key_policy(config.key_policy);
        if config.single_flight {
            state.cache = state.cache.with_single_flight();
        }
        state.environment = config.environment.clone();
        state.allowed_origins = config.allowed_origins();
        state
    }

    pub fn store(&self) -> &SharedStore {
        self.cache.store()
    }
}

/// Handler for GET /
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = state.started_at.elapsed().as_secs_f64();
    Json(HealthResponse::new(state.environment, uptime))
}

/// Handler for GET /api/sheets/validate
pub async fn validate_handler(State(state): State<AppState>) -> Result<Json<ConnectionInfo>> {
    Ok(Json(state.sheets.validate_connection().await?))
}

/// Handler for GET /api/sheets/data
pub async fn sheet_data_handler(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<SheetData>> {
    Ok(Json(state.sheets.sheet_data(&query.range, &query.sheet).await?))
}

/// Handler for GET /api/sheets/available
pub async fn available_sheets_handler(
    State(state): State<AppState>,
) -> Result<Json<AvailableSheets>> {
    Ok(Json(state.sheets.available_sheets().await?))
}

/// Handler for GET /api/sheets/financial-config
pub async fn financial_config_handler(
    State(state): State<AppState>,
    Query(query): Query<ScenarioQuery>,
) -> Json<FinancialConfig> {
    Json(state.sheets.financial_config(&query.scenario).await)
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.admin.stats().await))
}

/// Handler for POST /api/cache/clear
///
/// Accepts an empty body or `{"pattern": "..."}`.
pub async fn cache_clear_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClearResponse>> {
    let req: ClearRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ClearRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidRequest(e.to_string()))?
    };

    let pattern = req.pattern();
    let cleared = state.admin.clear(pattern).await;
    Ok(Json(ClearResponse::new(pattern, cleared)))
}

/// Fallback for unknown paths and for unsupported methods on known ones.
pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{Spreadsheet, ValueRange};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource;

    #[async_trait]
    impl SheetSource for StaticSource {
        async fn values(&self, range: &str) -> Result<ValueRange> {
            Ok(ValueRange {
                range: Some(range.to_string()),
                values: vec![vec![json!("x")]],
            })
        }

        async fn spreadsheet(&self) -> Result<Spreadsheet> {
            Err(AppError::Upstream("not configured".to_string()))
        }
    }

    fn test_state() -> AppState {
        AppState::new(cache::shared(CacheStore::new(300)), Arc::new(StaticSource))
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await;
        assert!(response.success);
        assert_eq!(response.environment, "development");
    }

    #[tokio::test]
    async fn test_sheet_data_handler() {
        let query = DataQuery {
            range: "A:B".to_string(),
            sheet: "Base".to_string(),
        };
        let response = sheet_data_handler(State(test_state()), Query(query)).await.unwrap();
        assert_eq!(response.row_count, 1);
        assert_eq!(response.range.as_deref(), Some("A:B"));
    }

    #[tokio::test]
    async fn test_validate_handler_propagates_upstream_error() {
        let result = validate_handler(State(test_state())).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_cache_clear_handler_empty_body() {
        let state = test_state();
        state.store().write().await.set("/a", json!({"success": true}), None);

        let response = cache_clear_handler(State(state.clone()), Bytes::new()).await.unwrap();
        assert_eq!(response.cleared, crate::cache::ClearOutcome::All);
        assert!(state.store().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_clear_handler_rejects_bad_json() {
        let result = cache_clear_handler(State(test_state()), Bytes::from_static(b"{oops")).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_not_found_handler_keeps_full_uri() {
        let uri: axum::http::Uri = "/api/sheets/nope?range=A:B".parse().unwrap();
        let error = not_found_handler(OriginalUri(uri)).await;
        assert!(matches!(error, AppError::NotFound(path) if path == "/api/sheets/nope?range=A:B"));
    }

    #[test]
    fn test_from_config_applies_cache_settings() {
        let config = Config {
            default_ttl: 42,
            environment: "production".to_string(),
            ..Config::default()
        };
        let state = AppState::from_config(&config, Arc::new(StaticSource));

        assert_eq!(state.environment, "production");
        assert_eq!(state.store().try_read().unwrap().default_ttl(), 42);
    }
}
