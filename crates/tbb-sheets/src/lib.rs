//! Google Sheets adapter (Sheets API v4).
//!
//! Implements the `tbb-core` SheetSource port over the `values.get`
//! endpoint with service-account credentials.

use async_trait::async_trait;
use serde::Deserialize;

use tbb_core::{
    errors::Error,
    ports::{CellGrid, SheetSource},
    Result,
};

pub mod auth;

pub use auth::ServiceAccountKey;

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Clone, Debug)]
pub struct GoogleSheetsClient {
    key: ServiceAccountKey,
    http: reqwest::Client,
}

impl GoogleSheetsClient {
    pub fn new(key: ServiceAccountKey, timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("http client build: {e}")))?;
        Ok(Self { key, http })
    }

    /// Exchange a signed assertion for a bearer token. Requested per fetch;
    /// nothing is cached between requests.
    async fn access_token(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let assertion = self.key.signed_assertion(chrono::Utc::now().timestamp())?;

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(map_send_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token request rejected: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token response decode: {e}")))?;

        Ok(token.access_token)
    }

    async fn fetch_range_inner(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &str,
    ) -> Result<CellGrid> {
        #[derive(Deserialize)]
        struct ValueRange {
            #[serde(default)]
            values: Vec<Vec<serde_json::Value>>,
        }

        let token = self.access_token().await?;

        let resp = self
            .http
            .get(values_url(spreadsheet_id, worksheet, range))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "sheet read rejected: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "sheet read failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let value_range: ValueRange = resp
            .json()
            .await
            .map_err(|e| Error::Transport(format!("sheet response decode: {e}")))?;

        let grid: CellGrid = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        // First row is the header; anything shorter carries no data rows.
        if grid.len() < 2 {
            return Err(Error::EmptyData(format!(
                "range {range} of spreadsheet {spreadsheet_id} has no data rows"
            )));
        }

        Ok(grid)
    }
}

fn values_url(spreadsheet_id: &str, worksheet: &str, range: &str) -> String {
    format!(
        "{SHEETS_ENDPOINT}/{spreadsheet_id}/values/{}!{range}",
        urlencoding::encode(worksheet)
    )
}

fn map_send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        return Error::Transport(format!("request timed out: {e}"));
    }
    Error::Transport(format!("request failed: {e}"))
}

/// Cells arrive as JSON strings under the default render option; anything
/// else is rendered to its JSON text, with null as an empty cell.
fn cell_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn fetch_range(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &str,
    ) -> Result<CellGrid> {
        match self
            .fetch_range_inner(spreadsheet_id, worksheet, range)
            .await
        {
            Ok(grid) => {
                tracing::info!(rows = grid.len(), %spreadsheet_id, %range, "fetched sheet data");
                Ok(grid)
            }
            Err(e) => {
                tracing::error!(
                    %spreadsheet_id,
                    %worksheet,
                    %range,
                    error = %e,
                    "sheet fetch failed"
                );
                Err(e)
            }
        }
    }
}
