//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

use crate::sheets::DEFAULT_SHEET;

/// Query for GET /api/sheets/data
#[derive(Debug, Clone, Deserialize)]
pub struct DataQuery {
    /// A1-notation range (default `A:Z`)
    #[serde(default = "default_range")]
    pub range: String,
    /// Tab name (default `Base`)
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

/// Query for GET /api/sheets/financial-config
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioQuery {
    #[serde(default = "default_sheet")]
    pub scenario: String,
}

fn default_range() -> String {
    "A:Z".to_string()
}

fn default_sheet() -> String {
    DEFAULT_SHEET.to_string()
}

/// Request body for POST /api/cache/clear
///
/// An absent body, an absent `pattern` and an empty `pattern` all mean
/// "flush everything".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ClearRequest {
    /// The substring to match, if any.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}
