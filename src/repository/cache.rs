//! On-disk offline cache for visit records.
//!
//! A single JSON file holding the visit list, newest first. Writes are
//! read-modify-write of the whole file, serialized behind an async mutex.
//! Reads degrade to an empty list when the file is missing or corrupt, so a
//! damaged cache never takes the read path down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::Visit,
};

use super::VisitCache;

#[derive(Clone)]
pub struct FileCacheRepository {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileCacheRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Vec<Visit> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read visit cache: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(visits) => visits,
            Err(e) => {
                tracing::warn!("Visit cache is corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    async fn persist(&self, visits: &[Visit]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create cache dir: {}", e)))?;
        }
        let bytes = serde_json::to_vec(visits)
            .map_err(|e| AppError::Internal(format!("Failed to encode visit cache: {}", e)))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write visit cache: {}", e)))
    }
}

#[async_trait]
impl VisitCache for FileCacheRepository {
    async fn read_all(&self) -> Vec<Visit> {
        self.load().await
    }

    async fn write_one(&self, visit: &Visit) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut visits = self.load().await;
        visits.insert(0, visit.clone());
        self.persist(&visits).await
    }

    async fn delete_one(&self, id: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut visits = self.load().await;
        let before = visits.len();
        visits.retain(|v| v.id != id);
        if visits.len() == before {
            return Ok(false);
        }
        self.persist(&visits).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scratch_cache() -> FileCacheRepository {
        let path = std::env::temp_dir()
            .join(format!("fieldlog-cache-test-{}.json", uuid::Uuid::new_v4()));
        FileCacheRepository::new(path)
    }

    fn visit(id: &str) -> Visit {
        Visit {
            id: id.to_string(),
            pharmacy_name: "Corner Pharmacy".to_string(),
            timestamp: Utc::now(),
            customer_contact: None,
            actions: vec!["Stock Check".to_string()],
            has_order: false,
            order_details: None,
            photo_url: None,
            notes: None,
            lead_rating: None,
            area_code: None,
            user: None,
            best_days: vec![],
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let cache = scratch_cache();
        tokio_test::block_on(async {
            assert!(cache.read_all().await.is_empty());
        });
    }

    #[tokio::test]
    async fn writes_prepend_newest_first() {
        let cache = scratch_cache();
        cache.write_one(&visit("first")).await.unwrap();
        cache.write_one(&visit("second")).await.unwrap();

        let ids: Vec<String> = cache.read_all().await.into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["second", "first"]);

        let _ = tokio::fs::remove_file(&cache.path).await;
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let cache = scratch_cache();
        cache.write_one(&visit("a")).await.unwrap();

        assert!(cache.delete_one("a").await.unwrap());
        assert!(!cache.delete_one("a").await.unwrap());
        assert!(cache.read_all().await.is_empty());

        let _ = tokio::fs::remove_file(&cache.path).await;
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let cache = scratch_cache();
        tokio::fs::write(&cache.path, b"not json").await.unwrap();
        assert!(cache.read_all().await.is_empty());

        let _ = tokio::fs::remove_file(&cache.path).await;
    }
}
