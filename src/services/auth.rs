//! PIN authentication against the rep directory

use std::sync::Arc;

use chrono::{Duration, Utc};
use indexmap::IndexSet;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{DirectoryEntry, RepClaims, RepProfile},
    repository::RepDirectory,
};

#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn RepDirectory>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(directory: Arc<dyn RepDirectory>, config: AuthConfig) -> Self {
        Self { directory, config }
    }

    /// Resolve a PIN into a rep profile and a signed session token
    pub async fn authenticate(&self, pin: &str) -> AppResult<(RepProfile, String)> {
        let entries = self.directory.fetch_entries().await?;
        let profile = resolve_profile(&entries, pin)
            .ok_or_else(|| AppError::Authentication("Invalid PIN".to_string()))?;

        let now = Utc::now();
        let claims = RepClaims {
            sub: profile.name.clone(),
            area_code: profile.area_code.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.session_expiration_hours as i64)).timestamp(),
        };
        let token = claims
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        Ok((profile, token))
    }
}

/// Match a PIN against the directory.
///
/// The same PIN may appear on several rows (one per territory); the profile
/// merges their distinct area codes in first-seen order into a comma-joined
/// string, taking the display name from the first match.
fn resolve_profile(entries: &[DirectoryEntry], pin: &str) -> Option<RepProfile> {
    let pin = pin.trim();
    if pin.is_empty() {
        return None;
    }

    let matches: Vec<&DirectoryEntry> = entries.iter().filter(|e| e.pin == pin).collect();
    let first = matches.first()?;

    let codes: IndexSet<&str> = matches
        .iter()
        .map(|e| e.area_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let area_code = codes.into_iter().collect::<Vec<_>>().join(", ");

    Some(RepProfile {
        name: first.name.clone(),
        area_code,
    })
}
