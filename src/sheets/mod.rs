//! Spreadsheet Module
//!
//! Data access for the spreadsheet backing the API. [`SheetSource`] is the
//! raw upstream (Google Sheets v4 REST in production); [`SheetsService`]
//! turns its ranges and metadata into the endpoint payloads.

mod client;
mod models;
mod service;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

pub use client::GoogleSheetsClient;
pub use models::{AvailableSheets, ConfigValue, ConnectionInfo, FinancialConfig, SheetData, SheetTab};
pub use service::{SheetsService, DEFAULT_SHEET};

/// Raw read access to one spreadsheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Reads the cells of an A1-notation range.
    async fn values(&self, range: &str) -> Result<ValueRange>;

    /// Reads spreadsheet-level metadata including its tabs.
    async fn spreadsheet(&self) -> Result<Spreadsheet>;
}

// == Upstream Wire Types ==

/// Cells returned for a range read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    /// Range actually covered, as resolved by the upstream
    pub range: Option<String>,
    /// Row-major cell values; absent when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: String,
    pub locale: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub hidden: bool,
}
