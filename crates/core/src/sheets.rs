//! Google Sheets values API client for the agreement spreadsheet.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info, instrument};

use crate::errors::{IntegrityError, SheetsError};

/// Source of the raw values payload of a spreadsheet range.
#[allow(async_fn_in_trait)]
pub trait SignerSheet {
    /// Fetch `GET /v4/spreadsheets/{id}/values/{range}` as raw JSON.
    async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<serde_json::Value, SheetsError>;
}

impl<T: SignerSheet + ?Sized> SignerSheet for &T {
    async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<serde_json::Value, SheetsError> {
        (**self).fetch_values(spreadsheet_id, range).await
    }
}

/// Asynchronous Sheets API client authenticated with an API key.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    api_url: String,
    key: String,
}

impl SheetsClient {
    pub fn new(api_url: impl Into<String>, key: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ipr-check/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");
        info!(api_url = %api_url, "created SheetsClient");
        Self {
            http,
            api_url,
            key: key.into(),
        }
    }
}

impl SignerSheet for SheetsClient {
    #[instrument(skip(self))]
    async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<serde_json::Value, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_url, spreadsheet_id, range
        );
        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.key.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SheetsError::ApiError {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SheetsError::ParseError(e.to_string()))?;
        debug!("fetched sheet values");
        Ok(payload)
    }
}

/// Flatten the `values` rows of a payload into a single list of cells.
///
/// The payload must carry a `values` array. Non-string cells are rendered
/// with their JSON text.
pub fn sheet_cells(payload: &serde_json::Value) -> Result<Vec<String>, IntegrityError> {
    let rows = payload
        .get("values")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IntegrityError::InvalidSheetData("payload has no 'values' array".into()))?;

    let mut cells = Vec::new();
    for row in rows {
        match row {
            serde_json::Value::Array(items) => cells.extend(items.iter().map(cell_text)),
            other => cells.push(cell_text(other)),
        }
    }
    Ok(cells)
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
