//! Adapters for the external stores the core depends on: the remote tabular
//! visit store, the on-disk offline cache, the rep directory and the photo
//! blob store.
//!
//! Services depend on the [`RecordStore`], [`VisitCache`] and [`RepDirectory`]
//! ports rather than the concrete adapters, so reporting logic can be tested
//! against mocks without network or filesystem access.

pub mod blob;
pub mod cache;
pub mod directory;
pub mod rows;
pub mod sheet;

use async_trait::async_trait;

use crate::{
    config::AppConfig,
    error::AppResult,
    models::{DirectoryEntry, Visit},
};

/// Remote tabular visit store.
///
/// `fetch_all` fails soft: an unconfigured store yields an empty sequence
/// (local-only mode), while a reachable-but-failing store is a distinct
/// upstream error. Writes are at-most-once; no retry happens here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_all(&self) -> AppResult<Vec<Visit>>;
    async fn append_one(&self, visit: &Visit) -> AppResult<()>;
    /// Full-row replace keyed by `visit.id`; `NotFound` if the ID is absent
    async fn update_one(&self, visit: &Visit) -> AppResult<()>;
    async fn delete_one(&self, id: &str) -> AppResult<()>;
    async fn patch_area_code(&self, id: &str, area_code: &str) -> AppResult<()>;
}

/// On-device offline cache with read-all / prepend-one semantics.
///
/// Reads degrade to empty on any corruption; there is no dedup on write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitCache: Send + Sync {
    async fn read_all(&self) -> Vec<Visit>;
    async fn write_one(&self, visit: &Visit) -> AppResult<()>;
    /// Returns whether a cached record with this ID existed
    async fn delete_one(&self, id: &str) -> AppResult<bool>;
}

/// External user directory resolving PIN credentials
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepDirectory: Send + Sync {
    async fn fetch_entries(&self) -> AppResult<Vec<DirectoryEntry>>;
}

/// Container for all store adapters
#[derive(Clone)]
pub struct Repository {
    pub sheet: sheet::SheetsRepository,
    pub cache: cache::FileCacheRepository,
    pub directory: directory::DirectoryRepository,
    pub blob: blob::BlobRepository,
}

impl Repository {
    /// Create all adapters from the application configuration
    pub fn new(config: &AppConfig) -> Self {
        let client = sheet::SheetsClient::new(config.sheets.clone());
        Self {
            sheet: sheet::SheetsRepository::new(client.clone()),
            directory: directory::DirectoryRepository::new(client),
            cache: cache::FileCacheRepository::new(&config.cache.path),
            blob: blob::BlobRepository::new(config.blob.clone()),
        }
    }
}
