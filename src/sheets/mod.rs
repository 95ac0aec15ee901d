//! REST client for the spreadsheet service.
//!
//! Covers both ends of the pipeline: reading the candidate list range
//! (source) and locating/creating/rewriting per-company worksheets (sink).
//! The spreadsheet is addressed by id and a stable API key; worksheets are
//! addressed by title.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::models::SourceRecord;

/// Configuration for the spreadsheet client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// API key used for all requests.
    #[serde(default)]
    pub api_key: String,
    /// Spreadsheet id holding both the candidate list and the sink sheets.
    #[serde(default)]
    pub spreadsheet_id: String,
    /// API endpoint base (default: https://sheets.googleapis.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            spreadsheet_id: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Errors from the spreadsheet transport.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// A worksheet within the spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetInfo {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

/// Seam for the candidate-list source stage.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read the configured range and return the candidate records, padded
    /// and filtered: short rows gain empty cells, rows without an
    /// identifier are dropped silently.
    async fn fetch_records(&self, range: &str) -> Result<Vec<SourceRecord>, SheetsError>;
}

/// Spreadsheet REST client.
pub struct SheetsClient {
    config: SheetsConfig,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SheetsError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}?key={}",
            self.config.base_url,
            self.config.spreadsheet_id,
            urlencoding::encode(range),
            suffix,
            self.config.api_key,
        )
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Read a range as rows of strings. An absent `values` field (empty
    /// range) yields an empty list.
    pub async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "");
        debug!(range, "fetching spreadsheet range");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SheetsError::Connection(e.to_string()))?;
        let resp = Self::check_status(resp).await?;

        let body: ValuesResponse = resp
            .json()
            .await
            .map_err(|e| SheetsError::Shape(e.to_string()))?;

        Ok(body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    /// List all worksheets with their ids and titles.
    pub async fn list_sheets(&self) -> Result<Vec<SheetInfo>, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?key={}&fields=sheets.properties",
            self.config.base_url, self.config.spreadsheet_id, self.config.api_key,
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SheetsError::Connection(e.to_string()))?;
        let resp = Self::check_status(resp).await?;

        let meta: SpreadsheetMeta = resp
            .json()
            .await
            .map_err(|e| SheetsError::Shape(e.to_string()))?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|s| SheetInfo {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    /// Create a new worksheet with the given title.
    pub async fn add_sheet(&self, title: &str) -> Result<(), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate?key={}",
            self.config.base_url, self.config.spreadsheet_id, self.config.api_key,
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": 5000, "columnCount": 6 }
                    }
                }
            }]
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetsError::Connection(e.to_string()))?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// Clear all values in a worksheet.
    pub async fn clear_sheet(&self, title: &str) -> Result<(), SheetsError> {
        let url = self.values_url(title, ":clear");

        let resp = self
            .client
            .post(&url)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| SheetsError::Connection(e.to_string()))?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// Overwrite a worksheet's content starting at A1, raw values.
    pub async fn write_rows(&self, title: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let range = format!("'{title}'!A1");
        let url = format!("{}&valueInputOption=RAW", self.values_url(&range, ""));
        let body = json!({ "values": rows });

        let resp = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetsError::Connection(e.to_string()))?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSource for SheetsClient {
    async fn fetch_records(&self, range: &str) -> Result<Vec<SourceRecord>, SheetsError> {
        let rows = self.fetch_range(range).await?;
        Ok(rows
            .iter()
            .filter_map(|row| SourceRecord::from_cells(row))
            .collect())
    }
}

/// Render a cell value as text. The API returns formatted strings, but a
/// raw-rendered numeric cell must not poison the whole range read.
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
