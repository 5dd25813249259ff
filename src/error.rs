//! Error types for the proxy
//!
//! Provides unified error handling using thiserror. The cache core itself
//! never fails; these errors come from the HTTP surface and the spreadsheet
//! upstream.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::NotFoundResponse;

// == App Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum AppError {
    /// No route matched; carries the path as the client sent it
    #[error("Endpoint not found")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The spreadsheet upstream failed or returned something unusable
    #[error("{0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::NotFound(path) = self {
            return (status, Json(NotFoundResponse::new(path))).into_response();
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (AppError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Upstream("down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }

    #[tokio::test]
    async fn test_not_found_renders_path() {
        let response = AppError::NotFound("/api/nope?x=1".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body,
            json!({"success": false, "error": "Endpoint not found", "path": "/api/nope?x=1"})
        );
    }

    #[test]
    fn test_upstream_message_is_passed_through() {
        let error = AppError::Upstream("Error accessing sheet Base: quota".to_string());
        assert_eq!(error.to_string(), "Error accessing sheet Base: quota");
    }
}
