//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies that are not
//! spreadsheet payloads.

use serde::Serialize;

use crate::cache::{AdminStats, ClearOutcome};

/// Response body for the health endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub environment: String,
    /// Seconds since the server started
    pub uptime: f64,
}

impl HealthResponse {
    pub fn new(environment: impl Into<String>, uptime: f64) -> Self {
        Self {
            success: true,
            message: format!("Sheets Proxy API v{}", env!("CARGO_PKG_VERSION")),
            timestamp: chrono::Utc::now().to_rfc3339(),
            environment: environment.into(),
            uptime,
        }
    }
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: AdminStats,
}

impl StatsResponse {
    pub fn new(stats: AdminStats) -> Self {
        Self {
            success: true,
            stats,
        }
    }
}

/// Response body for POST /api/cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub cleared: ClearOutcome,
}

impl ClearResponse {
    pub fn new(pattern: Option<&str>, cleared: ClearOutcome) -> Self {
        let message = match pattern {
            Some(pattern) => format!("Cache cleared for pattern: {}", pattern),
            None => "Cache cleared completely".to_string(),
        };
        Self {
            success: true,
            message,
            cleared,
        }
    }
}

/// Response body for unknown routes
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundResponse {
    pub success: bool,
    pub error: String,
    pub path: String,
}

impl NotFoundResponse {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            success: false,
            error: "Endpoint not found".to_string(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::new("production", 12.5);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["environment"], "production");
        assert!(json["message"].as_str().unwrap().starts_with("Sheets Proxy API v"));
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_clear_response_messages() {
        let pattern = ClearResponse::new(Some("sheets"), ClearOutcome::Pattern { count: 2 });
        let all = ClearResponse::new(None, ClearOutcome::All);

        assert_eq!(pattern.message, "Cache cleared for pattern: sheets");
        assert_eq!(all.message, "Cache cleared completely");
        assert_eq!(
            serde_json::to_value(&pattern).unwrap()["cleared"],
            json!({"kind": "pattern", "count": 2})
        );
    }

    #[test]
    fn test_not_found_response_serialize() {
        let resp = NotFoundResponse::new("/nope");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": false, "error": "Endpoint not found", "path": "/nope"}));
    }
}
