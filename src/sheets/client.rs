//! Google Sheets v4 REST client authenticated with an API key.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{SheetSource, Spreadsheet, ValueRange};
use crate::config::Config;
use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
}

impl GoogleSheetsClient {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.sheets_api_base.clone(),
            config.sheet_id.clone(),
            config.sheets_api_key.clone(),
        )
    }

    /// Builds `{base}/v4/spreadsheets/{id}/{extra...}`, percent-encoding
    /// each segment so ranges like `Base!A:Z` survive intact.
    pub fn endpoint(&self, extra: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("invalid Sheets API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Sheets API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Sheets API request: {}", url.path());
        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        return Err(AppError::Upstream(message));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn values(&self, range: &str) -> Result<ValueRange> {
        let url = self.endpoint(&["values", range])?;
        self.fetch(url).await
    }

    async fn spreadsheet(&self) -> Result<Spreadsheet> {
        let url = self.endpoint(&[])?;
        self.fetch(url).await
    }
}
