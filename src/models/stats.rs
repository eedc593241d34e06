//! Derived per-pharmacy statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::visit::LeadRating;

/// Fallback shown when the most recent visit recorded no contact person
pub const UNKNOWN_CONTACT: &str = "Unknown";

/// Rollup of all visits to one pharmacy.
///
/// Pure function of the current visit set plus scope plus optional user
/// filter; recomputed on every request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PharmacyStats {
    pub pharmacy_name: String,
    pub total_visits: usize,
    /// Max timestamp among the group
    pub last_visit: DateTime<Utc>,
    /// Contact from the most recent visit, or "Unknown"
    pub last_contact: String,
    pub last_user: Option<String>,
    /// At most 3 labels, frequency descending, ties in first-seen order
    pub top_actions: Vec<String>,
    /// From the most recent visit that has one set
    pub lead_rating: Option<LeadRating>,
    /// From the most recent visit that has one set
    pub area_code: Option<String>,
}
