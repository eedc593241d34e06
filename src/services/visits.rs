//! Visit record management: offline-first writes and reconciled reads

use std::sync::Arc;

use crate::{
    analysis::reconcile::merge_with_local,
    error::{AppError, AppResult},
    models::{visit::UPLOAD_FAILED_SENTINEL, Visit},
    repository::{RecordStore, VisitCache},
};

/// Result of submitting a visit: the record always lands in the local cache;
/// `synced` tells whether it also reached the remote store, and `message` is
/// suitable for direct display.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub visit: Visit,
    pub synced: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct VisitsService {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn VisitCache>,
}

impl VisitsService {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn VisitCache>) -> Self {
        Self { store, cache }
    }

    /// Fetch the remote store's visit set. Unconfigured stores yield an
    /// empty set; a reachable-but-failing store is an upstream error.
    pub async fn cloud_visits(&self) -> AppResult<Vec<Visit>> {
        self.store.fetch_all().await
    }

    /// Local cache contents, newest first
    pub async fn local_visits(&self) -> Vec<Visit> {
        self.cache.read_all().await
    }

    /// Reconciled view over store and cache.
    ///
    /// Both reads are issued concurrently and must complete before the
    /// merge. A failing store read degrades to the cache alone so callers
    /// always have something to render.
    pub async fn merged_visits(&self) -> Vec<Visit> {
        let (cloud, local) = tokio::join!(self.store.fetch_all(), self.cache.read_all());
        let cloud = cloud.unwrap_or_else(|e| {
            tracing::warn!("Store read failed, serving cache only: {}", e);
            Vec::new()
        });
        merge_with_local(cloud, &local)
    }

    /// Record a new visit: cache first, then the remote store.
    ///
    /// An unconfigured store is an accepted local-only state and still
    /// counts as success; any other store failure keeps the local record as
    /// the fallback of record and reports the failure in the message.
    pub async fn submit(&self, visit: Visit) -> SubmitOutcome {
        if let Err(e) = self.cache.write_one(&visit).await {
            tracing::warn!("Failed to cache visit {}: {}", visit.id, e);
        }

        // An inline photo that never made it to the blob store must not be
        // pushed into a spreadsheet cell; the store copy gets the sentinel.
        let mut store_copy = visit.clone();
        if store_copy
            .photo_url
            .as_deref()
            .is_some_and(|url| url.starts_with("data:"))
        {
            store_copy.photo_url = Some(UPLOAD_FAILED_SENTINEL.to_string());
        }

        match self.store.append_one(&store_copy).await {
            Ok(()) => SubmitOutcome {
                visit,
                synced: true,
                message: "Saved to cloud".to_string(),
            },
            Err(AppError::NotConfigured(_)) => SubmitOutcome {
                visit,
                synced: false,
                message: "Saved locally (cloud not configured)".to_string(),
            },
            Err(e) => {
                tracing::error!("Cloud save error: {}", e);
                SubmitOutcome {
                    visit,
                    synced: false,
                    message: format!("Saved locally, but cloud upload failed: {}", e),
                }
            }
        }
    }

    /// Look up a single visit in the reconciled view
    pub async fn get(&self, id: &str) -> AppResult<Visit> {
        self.merged_visits()
            .await
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::NotFound("Visit not found".to_string()))
    }

    /// Full-row replace of an existing visit
    pub async fn update(&self, visit: Visit) -> AppResult<Visit> {
        self.store.update_one(&visit).await?;
        Ok(visit)
    }

    /// Delete a visit from the store and evict the cached copy so it cannot
    /// resurface as local-only. A record that only ever existed locally is
    /// deleted from the cache alone.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        match self.store.delete_one(id).await {
            Ok(()) => {
                self.cache.delete_one(id).await?;
                Ok(())
            }
            Err(AppError::NotFound(_)) | Err(AppError::NotConfigured(_)) => {
                if self.cache.delete_one(id).await? {
                    Ok(())
                } else {
                    Err(AppError::NotFound("Visit not found".to_string()))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Patch only the area code of an existing visit
    pub async fn patch_area_code(&self, id: &str, area_code: &str) -> AppResult<()> {
        self.store.patch_area_code(id, area_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockRecordStore, MockVisitCache};
    use chrono::Utc;

    fn visit(id: &str) -> Visit {
        Visit {
            id: id.to_string(),
            pharmacy_name: "Corner Pharmacy".to_string(),
            timestamp: Utc::now(),
            customer_contact: None,
            actions: vec![],
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

    fn service(store: MockRecordStore, cache: MockVisitCache) -> VisitsService {
        VisitsService::new(Arc::new(store), Arc::new(cache))
    }

    #[tokio::test]
    async fn merged_view_appends_local_only_records() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_all().returning(|| Ok(vec![visit("A")]));
        let mut cache = MockVisitCache::new();
        cache
            .expect_read_all()
            .returning(|| vec![visit("A"), visit("B")]);

        let ids: Vec<String> = service(store, cache)
            .merged_visits()
            .await
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn merged_view_survives_store_failure() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_all()
            .returning(|| Err(AppError::Upstream("boom".to_string())));
        let mut cache = MockVisitCache::new();
        cache.expect_read_all().returning(|| vec![visit("B")]);

        let ids: Vec<String> = service(store, cache)
            .merged_visits()
            .await
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[tokio::test]
    async fn submit_reports_local_only_mode_as_success() {
        let mut store = MockRecordStore::new();
        store
            .expect_append_one()
            .returning(|_| Err(AppError::NotConfigured("no creds".to_string())));
        let mut cache = MockVisitCache::new();
        cache.expect_write_one().returning(|_| Ok(()));

        let outcome = service(store, cache).submit(visit("v1")).await;
        assert!(!outcome.synced);
        assert!(outcome.message.contains("not configured"));
    }

    #[tokio::test]
    async fn submit_downgrades_inline_photo_for_the_store() {
        let mut store = MockRecordStore::new();
        store
            .expect_append_one()
            .withf(|v: &Visit| v.photo_url.as_deref() == Some(UPLOAD_FAILED_SENTINEL))
            .returning(|_| Ok(()));
        let mut cache = MockVisitCache::new();
        cache
            .expect_write_one()
            .withf(|v: &Visit| v.photo_url.as_deref().is_some_and(|u| u.starts_with("data:")))
            .returning(|_| Ok(()));

        let mut v = visit("v1");
        v.photo_url = Some("data:image/jpeg;base64,AAAA".to_string());
        let outcome = service(store, cache).submit(v).await;
        assert!(outcome.synced);
        // The caller keeps the inline photo for local display
        assert!(outcome
            .visit
            .photo_url
            .as_deref()
            .is_some_and(|u| u.starts_with("data:")));
    }

    #[tokio::test]
    async fn delete_evicts_cache_copy() {
        let mut store = MockRecordStore::new();
        store.expect_delete_one().returning(|_| Ok(()));
        let mut cache = MockVisitCache::new();
        cache.expect_delete_one().returning(|_| Ok(true));

        assert!(service(store, cache).delete("v1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_of_local_only_record_uses_the_cache() {
        let mut store = MockRecordStore::new();
        store
            .expect_delete_one()
            .returning(|_| Err(AppError::NotFound("Visit ID not found".to_string())));
        let mut cache = MockVisitCache::new();
        cache.expect_delete_one().returning(|_| Ok(true));

        assert!(service(store, cache).delete("v1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_of_unknown_record_is_not_found() {
        let mut store = MockRecordStore::new();
        store
            .expect_delete_one()
            .returning(|_| Err(AppError::NotFound("Visit ID not found".to_string())));
        let mut cache = MockVisitCache::new();
        cache.expect_delete_one().returning(|_| Ok(false));

        let result = service(store, cache).delete("v1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
