//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint against an
//! in-memory spreadsheet.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sheets_proxy::api::create_router;
use sheets_proxy::cache::{shared, CacheStore, SharedStore};
use sheets_proxy::error::{AppError, Result};
use sheets_proxy::sheets::{
    Sheet, SheetProperties, SheetSource, Spreadsheet, SpreadsheetProperties, ValueRange,
};
use sheets_proxy::AppState;
use tower::ServiceExt;

// == Test Spreadsheet ==

/// Spreadsheet with a `Base` tab, a hidden tab and an empty config tab.
/// Counts every upstream read.
#[derive(Default)]
struct FakeSheets {
    reads: AtomicUsize,
}

impl FakeSheets {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn values(&self, range: &str) -> Result<ValueRange> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match range {
            "ConfigFinanciera!A:D" => Ok(ValueRange {
                range: Some("ConfigFinanciera!A1:D1000".to_string()),
                values: Vec::new(),
            }),
            r if r.starts_with("Missing!") => Err(AppError::Upstream(
                "Unable to parse range: Missing!A:Z".to_string(),
            )),
            r => Ok(ValueRange {
                range: Some(r.to_string()),
                values: vec![
                    vec![json!("Mes"), json!("Ingresos")],
                    vec![json!("Enero"), json!("1200")],
                ],
            }),
        }
    }

    async fn spreadsheet(&self) -> Result<Spreadsheet> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let tab = |id: i64, title: &str, hidden: bool| Sheet {
            properties: SheetProperties {
                sheet_id: id,
                title: title.to_string(),
                index: id,
                hidden,
            },
        };
        Ok(Spreadsheet {
            properties: SpreadsheetProperties {
                title: "Modelo Financiero".to_string(),
                locale: Some("es_ES".to_string()),
                time_zone: Some("Europe/Madrid".to_string()),
            },
            sheets: vec![tab(0, "Base", false), tab(1, "Borrador", true)],
        })
    }
}

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<FakeSheets>, SharedStore) {
    let sheets = Arc::new(FakeSheets::default());
    let store = shared(CacheStore::new(300));
    let state = AppState::new(store.clone(), sheets.clone());
    (create_router(state), sheets, store)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn clear_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/cache/clear")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Health Endpoint ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert!(json["message"].as_str().unwrap().starts_with("Sheets Proxy API"));
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["environment"], "development");
}

// == Sheet Data Endpoint ==

#[tokio::test]
async fn test_data_endpoint_is_cached() {
    let (app, sheets, _) = create_test_app();

    let first = app
        .clone()
        .oneshot(get_request("/api/sheets/data?range=A1:B2"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first.into_body()).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["rowCount"], 2);
    assert!(first.get("cached").is_none());

    let second = app
        .oneshot(get_request("/api/sheets/data?range=A1:B2"))
        .await
        .unwrap();
    let second = body_to_json(second.into_body()).await;
    assert_eq!(second["cached"], true);
    assert!(second["cacheTime"].is_string());
    assert_eq!(second["data"], first["data"]);

    assert_eq!(sheets.reads(), 1);
}

#[tokio::test]
async fn test_non_get_after_cached_get_is_not_served_from_cache() {
    let (app, sheets, store) = create_test_app();

    app.clone()
        .oneshot(get_request("/api/sheets/data"))
        .await
        .unwrap();

    for method in ["POST", "PUT", "DELETE"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/sheets/data")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", method);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Endpoint not found");
        assert!(json.get("cached").is_none());
    }

    let stats = store.read().await.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
    assert_eq!(sheets.reads(), 1);
}

#[tokio::test]
async fn test_data_endpoint_upstream_error() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(get_request("/api/sheets/data?sheet=Missing"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Error accessing sheet Missing"));
    assert!(store.read().await.is_empty());
}

// == Available Sheets Endpoint ==

#[tokio::test]
async fn test_available_sheets_hides_hidden_tabs() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(get_request("/api/sheets/available"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["sheets"].as_array().unwrap().len(), 1);
    assert_eq!(json["sheets"][0]["title"], "Base");
}

// == Financial Config Endpoint ==

#[tokio::test]
async fn test_unsuccessful_financial_config_is_not_cached() {
    let (app, sheets, store) = create_test_app();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/api/sheets/financial-config?scenario=Optimista"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["scenario"], "Optimista");
        assert_eq!(json["error"], "ConfigFinanciera sheet is empty");
        assert!(json.get("cached").is_none());
    }

    assert_eq!(sheets.reads(), 2);
    assert!(store.read().await.is_empty());
}

// == Validate Endpoint ==

#[tokio::test]
async fn test_validate_is_never_cached() {
    let (app, sheets, store) = create_test_app();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/api/sheets/validate"))
            .await
            .unwrap();
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["title"], "Modelo Financiero");
        assert_eq!(json["sheetCount"], 2);
    }

    assert_eq!(sheets.reads(), 2);
    assert!(store.read().await.is_empty());
}

// == Cache Stats Endpoint ==

#[tokio::test]
async fn test_stats_endpoint_reports_counters() {
    let (app, _, _) = create_test_app();

    app.clone()
        .oneshot(get_request("/api/sheets/data"))
        .await
        .unwrap();
    app.clone()
        .oneshot(get_request("/api/sheets/data"))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/api/cache/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["stats"]["keyCount"], 1);
    assert_eq!(json["stats"]["hits"], 1);
    assert_eq!(json["stats"]["misses"], 1);
    assert_eq!(json["stats"]["hitRate"], 0.5);
    assert!(json["stats"]["processMemory"].is_object());
}

// == Cache Clear Endpoint ==

#[tokio::test]
async fn test_clear_by_pattern() {
    let (app, _, store) = create_test_app();
    {
        let mut store = store.write().await;
        store.set("/api/sheets/data?range=A:Z", json!({"success": true}), None);
        store.set("/api/sheets/data?range=B:C", json!({"success": true}), None);
        store.set("/api/sheets/available", json!({"success": true}), None);
    }

    let response = app
        .oneshot(clear_request(r#"{"pattern":"sheets/data"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Cache cleared for pattern: sheets/data");
    assert_eq!(json["cleared"], json!({"kind": "pattern", "count": 2}));
    assert_eq!(
        store.read().await.keys(),
        vec!["/api/sheets/available".to_string()]
    );
}

#[tokio::test]
async fn test_clear_all_keeps_counters() {
    let (app, _, store) = create_test_app();
    app.clone()
        .oneshot(get_request("/api/sheets/available"))
        .await
        .unwrap();

    for body in ["", "{}", r#"{"pattern":""}"#] {
        let response = app.clone().oneshot(clear_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["message"], "Cache cleared completely");
        assert_eq!(json["cleared"], json!({"kind": "all"}));
    }

    let stats = store.read().await.stats();
    assert_eq!(stats.key_count, 0);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_clear_rejects_malformed_body() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(clear_request("{pattern")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
}

// == Unknown Routes ==

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(get_request("/api/sheets/missing?x=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Endpoint not found");
    assert_eq!(json["path"], "/api/sheets/missing?x=1");
}
