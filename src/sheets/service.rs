//! Endpoint logic over a [`SheetSource`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{
    AvailableSheets, ConfigValue, ConnectionInfo, FinancialConfig, SheetData, SheetSource,
    SheetTab,
};
use crate::error::{AppError, Result};

/// Tab holding the financial parameters: scenario, field, value, quantity.
const FINANCIAL_CONFIG_RANGE: &str = "ConfigFinanciera!A:D";

/// Sheet name whose ranges are passed through without a sheet prefix.
pub const DEFAULT_SHEET: &str = "Base";

#[derive(Clone)]
pub struct SheetsService {
    source: Arc<dyn SheetSource>,
}

impl SheetsService {
    pub fn new(source: Arc<dyn SheetSource>) -> Self {
        Self { source }
    }

    /// Reads `range` from `sheet`.
    pub async fn sheet_data(&self, range: &str, sheet: &str) -> Result<SheetData> {
        let full_range = if sheet == DEFAULT_SHEET {
            range.to_string()
        } else {
            format!("{}!{}", sheet, range)
        };
        info!("Fetching sheet data: {}", full_range);

        let values = self.source.values(&full_range).await.map_err(|e| {
            warn!("Failed to read {}: {}", full_range, e);
            AppError::Upstream(format!("Error accessing sheet {}: {}", sheet, e))
        })?;

        let row_count = values.values.len();
        info!("{} rows fetched from {}", row_count, sheet);

        Ok(SheetData {
            success: true,
            data: values.values,
            range: values.range,
            row_count,
        })
    }

    /// Lists visible tabs, counting hidden ones in the total.
    pub async fn available_sheets(&self) -> Result<AvailableSheets> {
        let spreadsheet = self.source.spreadsheet().await.map_err(|e| {
            warn!("Failed to list sheets: {}", e);
            AppError::Upstream(format!("Error getting sheets: {}", e))
        })?;

        let tabs: Vec<SheetTab> = spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| SheetTab {
                id: sheet.properties.sheet_id,
                title: sheet.properties.title,
                index: sheet.properties.index,
                hidden: sheet.properties.hidden,
            })
            .collect();
        let count = tabs.len();
        info!("{} sheets found", count);

        Ok(AvailableSheets {
            success: true,
            sheets: tabs.into_iter().filter(|tab| !tab.hidden).collect(),
            count,
        })
    }

    /// Loads the parameters of `scenario`.
    ///
    /// Never fails: upstream errors and an empty tab come back as an
    /// unsuccessful payload, which callers serve but the cache skips.
    pub async fn financial_config(&self, scenario: &str) -> FinancialConfig {
        match self.load_financial_config(scenario).await {
            Ok(config) => {
                info!(
                    "Financial config loaded for {} ({} fields)",
                    scenario,
                    config.len()
                );
                FinancialConfig {
                    success: true,
                    config,
                    scenario: scenario.to_string(),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Financial config unavailable for {}: {}", scenario, e);
                FinancialConfig {
                    success: false,
                    config: BTreeMap::new(),
                    scenario: scenario.to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn load_financial_config(&self, scenario: &str) -> Result<BTreeMap<String, ConfigValue>> {
        let rows = self.source.values(FINANCIAL_CONFIG_RANGE).await?.values;
        if rows.is_empty() {
            return Err(AppError::Upstream("ConfigFinanciera sheet is empty".to_string()));
        }

        let mut config = BTreeMap::new();
        for row in rows.iter().skip(1) {
            let row_scenario = row.first().map(cell_text).unwrap_or_default();
            let field = row.get(1).map(cell_text).unwrap_or_default();
            if row_scenario != scenario || field.is_empty() {
                continue;
            }
            config.insert(
                field,
                ConfigValue {
                    valor: row.get(2).map(cell_number).unwrap_or(0.0),
                    cantidad: row.get(3).map(cell_number).unwrap_or(0.0),
                },
            );
        }
        Ok(config)
    }

    /// Checks the spreadsheet is reachable and reports its metadata.
    pub async fn validate_connection(&self) -> Result<ConnectionInfo> {
        let spreadsheet = self.source.spreadsheet().await.map_err(|e| {
            warn!("Connection validation failed: {}", e);
            AppError::Upstream(format!("Connection validation failed: {}", e))
        })?;
        info!(
            "Connected to \"{}\" ({} sheets)",
            spreadsheet.properties.title,
            spreadsheet.sheets.len()
        );

        Ok(ConnectionInfo {
            success: true,
            sheet_count: spreadsheet.sheets.len(),
            title: spreadsheet.properties.title,
            locale: spreadsheet.properties.locale,
            time_zone: spreadsheet.properties.time_zone,
        })
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_number(cell: &Value) -> f64 {
    match cell {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_leading_float(s),
        _ => 0.0,
    }
}

/// Parses the longest numeric prefix of `raw`, 0 when there is none.
/// `"12.5%"` gives 12.5, `"abc"` gives 0.
pub fn parse_leading_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());

    (1..=end)
        .rev()
        .find_map(|i| s[..i].parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}
