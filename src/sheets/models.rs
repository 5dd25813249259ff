//! Payloads returned by the spreadsheet endpoints.
//!
//! Every payload carries a `success` flag; the response cache only stores
//! payloads where it is true.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// GET /api/sheets/data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub success: bool,
    pub data: Vec<Vec<Value>>,
    pub range: Option<String>,
    pub row_count: usize,
}

/// One tab of the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetTab {
    pub id: i64,
    pub title: String,
    pub index: i64,
    pub hidden: bool,
}

/// GET /api/sheets/available
#[derive(Debug, Clone, Serialize)]
pub struct AvailableSheets {
    pub success: bool,
    /// Visible tabs only
    pub sheets: Vec<SheetTab>,
    /// Total tab count, hidden tabs included
    pub count: usize,
}

/// A single financial parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfigValue {
    pub valor: f64,
    pub cantidad: f64,
}

/// GET /api/sheets/financial-config
#[derive(Debug, Clone, Serialize)]
pub struct FinancialConfig {
    pub success: bool,
    pub config: BTreeMap<String, ConfigValue>,
    pub scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/sheets/validate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub success: bool,
    pub title: String,
    pub sheet_count: usize,
    pub locale: Option<String>,
    pub time_zone: Option<String>,
}
