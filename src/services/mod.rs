//! Business logic services

pub mod auth;
pub mod photos;
pub mod stats;
pub mod visits;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{RecordStore, RepDirectory, Repository, VisitCache},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub visits: visits::VisitsService,
    pub stats: stats::StatsService,
    pub photos: photos::PhotosService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(repository.sheet.clone());
        let cache: Arc<dyn VisitCache> = Arc::new(repository.cache.clone());
        let directory: Arc<dyn RepDirectory> = Arc::new(repository.directory.clone());

        Self {
            auth: auth::AuthService::new(directory, auth_config),
            visits: visits::VisitsService::new(store.clone(), cache),
            stats: stats::StatsService::new(store),
            photos: photos::PhotosService::new(repository.blob),
        }
    }
}
