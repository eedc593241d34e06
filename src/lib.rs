//! FieldLog Field Sales Visit Tracking System
//!
//! A Rust server for logging pharmacy visits from the field, reconciling an
//! offline cache with a spreadsheet-backed store and deriving per-pharmacy
//! statistics behind a REST JSON API.

use std::sync::Arc;

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
