//! Customer statistics service

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    analysis::{classify_overdue, customer_stats, AccessScope, OverdueReport},
    error::AppResult,
    models::PharmacyStats,
    repository::RecordStore,
};

/// Aggregation result: per-pharmacy rollups plus the distinct user names
/// visible to the requester (for filter-suggestion UI)
#[derive(Debug)]
pub struct CustomerStatsResult {
    pub stats: Vec<PharmacyStats>,
    pub users: Vec<String>,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn RecordStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Aggregate per-pharmacy rollups under the given access-scope profile.
    ///
    /// The aggregation read path trusts the remote store exclusively:
    /// without a per-record sync-state flag, folding the local cache in here
    /// would double-count already-synced visits. Freshly created records
    /// appear in the reconciled visit views until they propagate.
    pub async fn customer_stats(
        &self,
        scope_profile: &str,
        filter_user: Option<&str>,
    ) -> AppResult<CustomerStatsResult> {
        let visits = self.store.fetch_all().await?;
        let scope = AccessScope::parse(scope_profile);
        let (stats, users) = customer_stats(&visits, &scope, filter_user);
        Ok(CustomerStatsResult { stats, users })
    }

    /// Bucket scoped pharmacies into overdue tiers against `now`
    pub async fn overdue_report(
        &self,
        scope_profile: &str,
        now: DateTime<Utc>,
    ) -> AppResult<OverdueReport> {
        let result = self.customer_stats(scope_profile, None).await?;
        Ok(classify_overdue(&result.stats, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Visit;
    use crate::repository::MockRecordStore;
    use chrono::TimeZone;

    fn visit(id: &str, pharmacy: &str, area: Option<&str>, user: Option<&str>) -> Visit {
        Visit {
            id: id.to_string(),
            pharmacy_name: pharmacy.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            customer_contact: None,
            actions: vec!["Stock Check".to_string()],
            has_order: false,
            order_details: None,
            photo_url: None,
            notes: None,
            lead_rating: None,
            area_code: area.map(String::from),
            user: user.map(String::from),
            best_days: vec![],
        }
    }

    #[tokio::test]
    async fn scopes_and_aggregates_store_visits() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_all().returning(|| {
            Ok(vec![
                visit("1", "Alpha", Some("2A"), Some("Sam")),
                visit("2", "Beta", Some("9Z"), Some("Alex")),
            ])
        });

        let service = StatsService::new(Arc::new(store));
        let result = service.customer_stats("2A", None).await.unwrap();
        assert_eq!(result.stats.len(), 1);
        assert_eq!(result.stats[0].pharmacy_name, "Alpha");
        assert_eq!(result.users, vec!["Sam".to_string()]);
    }

    #[tokio::test]
    async fn empty_store_aggregates_to_empty_success() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_all().returning(|| Ok(vec![]));

        let service = StatsService::new(Arc::new(store));
        let result = service.customer_stats("All", None).await.unwrap();
        assert!(result.stats.is_empty());
        assert!(result.users.is_empty());
    }

    #[tokio::test]
    async fn unreachable_store_is_a_distinct_error() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_all()
            .returning(|| Err(AppError::Upstream("timeout".to_string())));

        let service = StatsService::new(Arc::new(store));
        let result = service.customer_stats("All", None).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn overdue_report_classifies_against_injected_clock() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_all()
            .returning(|| Ok(vec![visit("1", "Alpha", None, None)]));

        let service = StatsService::new(Arc::new(store));
        let now = Utc.with_ymd_and_hms(2024, 12, 15, 10, 0, 0).unwrap();
        let report = service.overdue_report("All", now).await.unwrap();
        // Last visit was 9 months before `now`
        assert_eq!(report.urgent.len(), 1);
        assert!(report.warning.is_empty());
        assert!(report.soon.is_empty());
    }
}
