//! Photo blob store adapter.
//!
//! Uploads base64 data-URL photos to an HTTP blob store and keeps total
//! usage inside a fixed budget by evicting the oldest blobs once usage
//! crosses 90% of the limit, clearing down to 85% so the sweep does not run
//! on every upload.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    config::BlobConfig,
    error::{AppError, AppResult},
};

/// Usage ratio at which eviction starts
const CLEANUP_THRESHOLD_RATIO: f64 = 0.9;
/// Usage ratio eviction clears down to
const TARGET_RATIO: f64 = 0.85;

/// One stored blob as reported by the listing endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct BlobListing {
    #[serde(default)]
    blobs: Vec<BlobInfo>,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Clone)]
pub struct BlobRepository {
    http: reqwest::Client,
    config: BlobConfig,
}

impl BlobRepository {
    pub fn new(config: BlobConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.config
            .token
            .as_deref()
            .ok_or_else(|| AppError::NotConfigured("Missing blob store token".to_string()))
    }

    /// Upload a base64 data-URL image and return its public URL.
    ///
    /// Runs the storage-budget sweep after the upload; a failing sweep is
    /// logged and does not fail the upload itself.
    pub async fn upload_image(&self, data_url: &str, filename: &str) -> AppResult<String> {
        let token = self.token()?;

        let encoded = data_url
            .rsplit(";base64,")
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| AppError::Validation("Invalid image payload".to_string()))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| AppError::Validation("Invalid image payload".to_string()))?;

        let url = format!("{}/{}", self.config.base_url, filename);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .header("content-type", "image/jpeg")
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Blob upload returned {}",
                response.status()
            )));
        }
        let uploaded: UploadResponse = response.json().await?;

        if let Err(e) = self.enforce_storage_budget(token).await {
            tracing::warn!("Blob storage sweep failed: {}", e);
        }

        Ok(uploaded.url)
    }

    async fn list(&self, token: &str) -> AppResult<Vec<BlobInfo>> {
        let response = self
            .http
            .get(&self.config.base_url)
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Blob listing returned {}",
                response.status()
            )));
        }
        let listing: BlobListing = response.json().await?;
        Ok(listing.blobs)
    }

    async fn delete(&self, token: &str, url: &str) -> AppResult<()> {
        let endpoint = format!("{}/delete", self.config.base_url);
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(token)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Blob delete returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Evict oldest blobs until usage is back under the target ratio
    async fn enforce_storage_budget(&self, token: &str) -> AppResult<()> {
        let blobs = self.list(token).await?;
        let total: u64 = blobs.iter().map(|b| b.size).sum();
        let limit = self.config.storage_limit_bytes;
        tracing::debug!("Blob storage usage: {} of {} bytes", total, limit);

        let threshold = (limit as f64 * CLEANUP_THRESHOLD_RATIO) as u64;
        if total <= threshold {
            return Ok(());
        }

        tracing::info!("Blob storage over threshold, evicting oldest blobs");
        let target = (limit as f64 * TARGET_RATIO) as u64;
        for blob in plan_eviction(blobs, total, target) {
            tracing::info!("Deleting old blob {} ({} bytes)", blob.pathname, blob.size);
            self.delete(token, &blob.url).await?;
        }
        Ok(())
    }
}

/// Pick the blobs to delete, oldest first, until usage reaches `target`
fn plan_eviction(mut blobs: Vec<BlobInfo>, mut total: u64, target: u64) -> Vec<BlobInfo> {
    blobs.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
    let mut doomed = Vec::new();
    for blob in blobs {
        if total <= target {
            break;
        }
        total = total.saturating_sub(blob.size);
        doomed.push(blob);
    }
    doomed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blob(pathname: &str, size: u64, day: u32) -> BlobInfo {
        BlobInfo {
            url: format!("https://blobs.example/{}", pathname),
            pathname: pathname.to_string(),
            size,
            uploaded_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn evicts_oldest_first_down_to_target() {
        let blobs = vec![blob("new", 40, 20), blob("old", 40, 1), blob("mid", 40, 10)];
        let plan = plan_eviction(blobs, 120, 50);
        let names: Vec<&str> = plan.iter().map(|b| b.pathname.as_str()).collect();
        assert_eq!(names, vec!["old", "mid"]);
    }

    #[test]
    fn evicts_nothing_when_already_under_target() {
        let plan = plan_eviction(vec![blob("only", 10, 1)], 10, 50);
        assert!(plan.is_empty());
    }

    #[test]
    fn eviction_stops_exactly_at_target() {
        let blobs = vec![blob("a", 30, 1), blob("b", 30, 2), blob("c", 30, 3)];
        let plan = plan_eviction(blobs, 90, 60);
        let names: Vec<&str> = plan.iter().map(|b| b.pathname.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
