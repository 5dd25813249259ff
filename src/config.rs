//! Configuration Module
//!
//! Handles loading server configuration from environment variables. Values
//! are read once at startup and fixed for the process lifetime.

use std::env;
use std::str::FromStr;

use crate::api::KeyPolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for cached responses
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// How cache keys are derived from the request URI
    pub key_policy: KeyPolicy,
    /// Coalesce concurrent misses for the same key
    pub single_flight: bool,
    /// HTTP server port
    pub server_port: u16,
    /// Deployment environment name reported by the health endpoint
    pub environment: String,
    /// Extra allowed CORS origin
    pub frontend_url: Option<String>,
    /// Google Sheets API key
    pub sheets_api_key: String,
    /// Spreadsheet id
    pub sheet_id: String,
    /// Sheets REST API base URL
    pub sheets_api_base: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_CHECK_PERIOD` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_KEY_POLICY` - `raw` or `sorted` (default: raw)
    /// - `CACHE_SINGLE_FLIGHT` - `true`/`false` (default: false)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `APP_ENV` - Environment name (default: development)
    /// - `FRONTEND_URL` - Additional CORS origin (default: unset)
    /// - `GOOGLE_SHEETS_API_KEY`, `GOOGLE_SHEET_ID` - Upstream credentials
    /// - `SHEETS_API_BASE` - Upstream base URL
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.default_ttl),
            sweep_interval: parse_var("CACHE_CHECK_PERIOD").unwrap_or(defaults.sweep_interval),
            key_policy: parse_var("CACHE_KEY_POLICY").unwrap_or(defaults.key_policy),
            single_flight: parse_var("CACHE_SINGLE_FLIGHT").unwrap_or(defaults.single_flight),
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            environment: string_var("APP_ENV").unwrap_or(defaults.environment),
            frontend_url: string_var("FRONTEND_URL"),
            sheets_api_key: string_var("GOOGLE_SHEETS_API_KEY").unwrap_or_default(),
            sheet_id: string_var("GOOGLE_SHEET_ID").unwrap_or_default(),
            sheets_api_base: string_var("SHEETS_API_BASE").unwrap_or(defaults.sheets_api_base),
        }
    }

    /// Origins allowed by the CORS layer.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:8080".to_string(),
        ];
        origins.extend(self.frontend_url.clone());
        origins
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            sweep_interval: 60,
            key_policy: KeyPolicy::Raw,
            single_flight: false,
            server_port: 3000,
            environment: "development".to_string(),
            frontend_url: None,
            sheets_api_key: String::new(),
            sheet_id: String::new(),
            sheets_api_base: "https://sheets.googleapis.com".to_string(),
        }
    }
}

fn string_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
