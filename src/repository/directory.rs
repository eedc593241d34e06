//! Rep directory adapter.
//!
//! The directory is a second spreadsheet (`Area Code | User | PIN`) managed
//! by hand. Fetching fails soft to an empty directory, which simply makes
//! every PIN invalid instead of taking login down with the store.

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::DirectoryEntry,
};

use super::{rows, sheet::SheetsClient, RepDirectory};

/// A1 range covering the directory column contract
const DIRECTORY_RANGE: &str = "Sheet1!A:C";

#[derive(Clone)]
pub struct DirectoryRepository {
    client: SheetsClient,
}

impl DirectoryRepository {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepDirectory for DirectoryRepository {
    async fn fetch_entries(&self) -> AppResult<Vec<DirectoryEntry>> {
        let Some(spreadsheet_id) = self.client.config().directory_spreadsheet_id.clone() else {
            tracing::debug!("Rep directory not configured; returning empty directory");
            return Ok(Vec::new());
        };
        if !self.client.has_credentials() {
            tracing::debug!("Rep directory credentials absent; returning empty directory");
            return Ok(Vec::new());
        }

        let sheet_rows = match self.client.values_get(&spreadsheet_id, DIRECTORY_RANGE).await {
            Ok(rows) => rows,
            Err(AppError::NotConfigured(_)) => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!("Error fetching rep directory: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut entries = Vec::new();
        for (index, row) in sheet_rows.iter().enumerate() {
            if index == 0 && rows::is_directory_header(row) {
                continue;
            }
            if let Some(entry) = rows::decode_directory_row(row) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
