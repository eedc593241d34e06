//! Remote tabular store adapter backed by a Google-Sheets-style values API.
//!
//! Authentication uses the service-account flow: an RS256-signed JWT
//! assertion is exchanged for a short-lived bearer token, which is cached
//! until close to expiry. Every credential is optional; reads degrade to an
//! empty result without one, writes report a distinguishable "not
//! configured" failure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    config::SheetsConfig,
    error::{AppError, AppResult},
    models::Visit,
};

use super::{rows, RecordStore};

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// A1 range covering the full visit column contract
const VISITS_RANGE: &str = "Sheet1!A:M";
/// A1 range of the ID column, used to locate a row by visit ID
const ID_RANGE: &str = "Sheet1!A:A";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<String>>>,
}

#[derive(Serialize)]
struct ValuePayload {
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
}

/// Low-level authenticated client for the spreadsheet values API, shared by
/// the visit store and the rep directory.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    config: SheetsConfig,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Whether service-account credentials are present at all
    pub fn has_credentials(&self) -> bool {
        self.config.service_account_email.is_some() && self.config.private_key.is_some()
    }

    /// Get a bearer token, refreshing the cached one when close to expiry
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() + Duration::seconds(60) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let email = self.config.service_account_email.as_deref().ok_or_else(|| {
            AppError::NotConfigured("Missing service account email".to_string())
        })?;
        let key = self.config.private_key.as_deref().ok_or_else(|| {
            AppError::NotConfigured("Missing service account key".to_string())
        })?;

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: email,
            scope: SHEETS_SCOPE,
            aud: &self.config.token_url,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let encoding_key = EncodingKey::from_rsa_pem(key.as_bytes())
            .map_err(|e| AppError::NotConfigured(format!("Invalid service account key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token assertion: {}", e)))?;

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(token.expires_in.saturating_sub(60)),
        };
        *self.token.write().await = Some(cached);

        Ok(token.access_token)
    }

    /// Read a cell range as raw rows
    pub async fn values_get(&self, spreadsheet_id: &str, range: &str) -> AppResult<Vec<Vec<String>>> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.config.api_base, spreadsheet_id, range
        );
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Values read returned {}",
                response.status()
            )));
        }
        let body: ValueRange = response.json().await?;
        Ok(body.values.unwrap_or_default())
    }

    /// Append one row after the last row of the range
    pub async fn values_append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> AppResult<()> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.config.api_base, spreadsheet_id, range
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&ValuePayload { values: vec![row] })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Values append returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Overwrite a cell range
    pub async fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
        value_input_option: &str,
    ) -> AppResult<()> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}?valueInputOption={}",
            self.config.api_base, spreadsheet_id, range, value_input_option
        );
        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .json(&ValuePayload { values: rows })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Values update returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Delete a whole row, shifting the rows below it up
    pub async fn delete_row(&self, spreadsheet_id: &str, row_index: usize) -> AppResult<()> {
        // The grid sheet ID (an integer) is needed for structural edits;
        // the first sheet is used, matching the single-sheet setup.
        let token = self.access_token().await?;
        let meta_url = format!("{}/spreadsheets/{}", self.config.api_base, spreadsheet_id);
        let response = self.http.get(&meta_url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Spreadsheet metadata returned {}",
                response.status()
            )));
        }
        let meta: SpreadsheetMeta = response.json().await?;
        let sheet_id = meta
            .sheets
            .first()
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| AppError::Upstream("No sheet found in spreadsheet".to_string()))?;

        let batch_url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.config.api_base, spreadsheet_id
        );
        let body = serde_json::json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row_index,
                        "endIndex": row_index + 1,
                    }
                }
            }]
        });
        let response = self
            .http
            .post(&batch_url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Row delete returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Visit store backed by the spreadsheet
#[derive(Clone)]
pub struct SheetsRepository {
    client: SheetsClient,
}

impl SheetsRepository {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }

    fn spreadsheet_id(&self) -> AppResult<&str> {
        self.client
            .config()
            .visits_spreadsheet_id
            .as_deref()
            .ok_or_else(|| AppError::NotConfigured("Missing visits spreadsheet ID".to_string()))
    }

    /// Locate the 0-based row index holding the given visit ID
    async fn find_row_index(&self, spreadsheet_id: &str, id: &str) -> AppResult<usize> {
        let rows = self.client.values_get(spreadsheet_id, ID_RANGE).await?;
        rows.iter()
            .position(|row| row.first().map(String::as_str) == Some(id))
            .ok_or_else(|| AppError::NotFound("Visit ID not found".to_string()))
    }
}

#[async_trait]
impl RecordStore for SheetsRepository {
    async fn fetch_all(&self) -> AppResult<Vec<Visit>> {
        let spreadsheet_id = match self.spreadsheet_id() {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!("Visit store not configured; returning empty set");
                return Ok(Vec::new());
            }
        };
        if !self.client.has_credentials() {
            tracing::debug!("Visit store credentials absent; returning empty set");
            return Ok(Vec::new());
        }

        let sheet_rows = self.client.values_get(spreadsheet_id, VISITS_RANGE).await?;
        let fallback_now = Utc::now();

        let mut visits = Vec::with_capacity(sheet_rows.len());
        for (index, row) in sheet_rows.iter().enumerate() {
            if index == 0 && rows::is_header(row) {
                continue;
            }
            let id_cell = row.first().map(String::as_str).unwrap_or("");
            if rows::is_header_id(id_cell) {
                continue;
            }
            match rows::decode_row(row, index, fallback_now) {
                Ok(visit) => visits.push(visit),
                Err(e) => tracing::warn!("Skipping malformed row: {}", e),
            }
        }
        Ok(visits)
    }

    async fn append_one(&self, visit: &Visit) -> AppResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?;
        self.client
            .values_append(spreadsheet_id, VISITS_RANGE, rows::encode_row(visit))
            .await
    }

    async fn update_one(&self, visit: &Visit) -> AppResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let row_index = self.find_row_index(spreadsheet_id, &visit.id).await?;
        // A1 notation is 1-based
        let range = format!("Sheet1!A{}:M{}", row_index + 1, row_index + 1);
        self.client
            .values_update(
                spreadsheet_id,
                &range,
                vec![rows::encode_row(visit)],
                "USER_ENTERED",
            )
            .await
    }

    async fn delete_one(&self, id: &str) -> AppResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let row_index = self.find_row_index(spreadsheet_id, id).await?;
        self.client.delete_row(spreadsheet_id, row_index).await
    }

    async fn patch_area_code(&self, id: &str, area_code: &str) -> AppResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let row_index = self.find_row_index(spreadsheet_id, id).await?;
        let range = format!(
            "Sheet1!{}{}",
            rows::AREA_CODE_COLUMN_LETTER,
            row_index + 1
        );
        self.client
            .values_update(
                spreadsheet_id,
                &range,
                vec![vec![area_code.to_string()]],
                "RAW",
            )
            .await
    }
}
