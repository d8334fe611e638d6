//! Google Sheets v4 REST client.
//!
//! Only the `spreadsheets.values` endpoints are used: get, update and clear.
//! The OAuth access token is obtained elsewhere and passed in ready to use.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::ApiError;
use crate::models::{CellValue, SheetGrid};

use super::SheetsApi;

/// Base URL for the Sheets values API
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Browser URL prefix for a spreadsheet, for log output
pub const SHEETS_ROOT_URL: &str = "https://docs.google.com/spreadsheets/d/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<CellValue>],
}

/// Sheets API client bound to a single spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Sheets HTTP client")?;

        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
            token: token.to_string(),
        })
    }

    /// Link to the spreadsheet in a browser
    pub fn browser_url(&self) -> String {
        format!("{}{}", SHEETS_ROOT_URL, self.spreadsheet_id)
    }

    /// `.../spreadsheets/{id}/values/{range}{suffix}` with the range percent-encoded
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API_BASE)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API base URL cannot take path segments"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}

impl SheetsApi for SheetsClient {
    async fn read_range(&self, range: &str) -> Result<SheetGrid> {
        let url = self.values_url(range, "")?;
        debug!(range = range, "Reading sheet range");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .with_context(|| format!("Failed to read sheet range {}", range))?;

        let response = Self::check_response(response).await?;
        let parsed: ValueRange = response
            .json()
            .await
            .with_context(|| format!("Failed to parse values for {}", range))?;

        Ok(SheetGrid::new(
            parsed
                .values
                .into_iter()
                .map(|row| row.into_iter().map(value_to_string).collect())
                .collect(),
        ))
    }

    async fn write_range(&self, range: &str, values: &[Vec<CellValue>]) -> Result<()> {
        let url = self.values_url(range, "")?;
        debug!(range = range, rows = values.len(), "Writing sheet range");

        let body = ValueRangeBody {
            major_dimension: "ROWS",
            values,
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to write sheet range {}", range))?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        let url = self.values_url(range, ":clear")?;
        debug!(range = range, "Clearing sheet range");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Failed to clear sheet range {}", range))?;

        Self::check_response(response).await?;
        Ok(())
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SheetsClient {
        SheetsClient::new("abc123", "token", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = client().values_url("'Next Sunday'!B2", "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'Next%20Sunday'!B2"
        );
    }

    #[test]
    fn test_values_url_clear_suffix() {
        let url = client().values_url("Overview", ":clear").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Overview:clear"
        );
    }

    #[test]
    fn test_browser_url() {
        assert_eq!(client().browser_url(), "https://docs.google.com/spreadsheets/d/abc123");
    }

    #[test]
    fn test_parse_value_range() {
        let json = r#"{"range":"Summary!A1:C2","majorDimension":"ROWS","values":[["Attendance","Morning Service"],["Adults",98]]}"#;
        let parsed: ValueRange = serde_json::from_str(json).unwrap();
        let rows: Vec<Vec<String>> = parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(value_to_string).collect())
            .collect();
        assert_eq!(rows[1], vec!["Adults", "98"]);
    }

    #[test]
    fn test_parse_empty_value_range() {
        // The API omits `values` entirely for an empty range
        let parsed: ValueRange = serde_json::from_str(r#"{"range":"Summary!A1:Z1000"}"#).unwrap();
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn test_update_body_shape() {
        let values = vec![vec![CellValue::from("Worship"), CellValue::from(3)]];
        let body = ValueRangeBody {
            major_dimension: "ROWS",
            values: &values,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"majorDimension":"ROWS","values":[["Worship",3]]}"#
        );
    }
}
