//! API Routes
//!
//! Configures the Axum router with the spreadsheet and cache endpoints.

use std::any::Any;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::error;

use super::handlers::{
    available_sheets_handler, cache_clear_handler, cache_stats_handler, financial_config_handler,
    health_handler, not_found_handler, sheet_data_handler, validate_handler, AppState,
};
use super::middleware::response_cache;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Health check
/// - `GET /api/sheets/validate` - Upstream connection check (not cached)
/// - `GET /api/sheets/data` - Sheet range (cached)
/// - `GET /api/sheets/available` - Visible tabs (cached)
/// - `GET /api/sheets/financial-config` - Scenario parameters (cached)
/// - `GET /api/cache/stats` - Cache statistics
/// - `POST /api/cache/clear` - Cache invalidation
///
/// Any other method on a known path gets the same JSON 404 as an unknown
/// path.
///
/// # Middleware
/// The response cache wraps the matched handler only (`route_layer`), inside
/// compression, so it always stores uncompressed JSON. Outer layers: panic
/// catching, security headers, compression, CORS, request tracing.
pub fn create_router(state: AppState) -> Router {
    let cached = from_fn_with_state(state.cache.clone(), response_cache);

    let sheets = Router::new()
        .route(
            "/validate",
            get(validate_handler).fallback(not_found_handler),
        )
        .route(
            "/data",
            get(sheet_data_handler)
                .route_layer(cached.clone())
                .fallback(not_found_handler),
        )
        .route(
            "/available",
            get(available_sheets_handler)
                .route_layer(cached.clone())
                .fallback(not_found_handler),
        )
        .route(
            "/financial-config",
            get(financial_config_handler)
                .route_layer(cached)
                .fallback(not_found_handler),
        );

    let cache_admin = Router::new()
        .route(
            "/stats",
            get(cache_stats_handler).fallback(not_found_handler),
        )
        .route(
            "/clear",
            post(cache_clear_handler).fallback(not_found_handler),
        );

    let expose_panics = state.environment != "production";
    let cors = cors_layer(&state.allowed_origins);

    let router = Router::new()
        .route("/", get(health_handler).fallback(not_found_handler))
        .nest("/api/sheets", sheets)
        .nest("/api/cache", cache_admin)
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(panic, expose_panics)
        }));

    with_security_headers(router)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser hardening headers, set unless a handler already chose a value.
/// No content security or embedder policy: the API is consumed cross-origin
/// by a separate frontend.
const SECURITY_HEADERS: [(&str, &str); 11] = [
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("Server error: {}", details);

    let mut body = json!({
        "success": false,
        "error": "Internal server error"
    });
    if expose {
        body["details"] = json!(details);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
