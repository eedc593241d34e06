//! Visit model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Sentinel stored in `photo_url` when a photo upload failed and the record
/// was synced without its image.
pub const UPLOAD_FAILED_SENTINEL: &str = "Image Upload Failed";

/// Sales potential of a cold-call visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LeadRating {
    Low,
    Medium,
    High,
}

impl LeadRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadRating::Low => "Low",
            LeadRating::Medium => "Medium",
            LeadRating::High => "High",
        }
    }

    /// Parse a spreadsheet cell. Manually edited sheets carry arbitrary
    /// casing; anything unrecognized maps to no rating rather than an error.
    pub fn from_cell(cell: &str) -> Option<Self> {
        match cell.trim().to_lowercase().as_str() {
            "low" => Some(LeadRating::Low),
            "medium" => Some(LeadRating::Medium),
            "high" => Some(LeadRating::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for LeadRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One logged interaction between a representative and a pharmacy.
///
/// Append-only: created by the visit-entry form, optionally replaced in full
/// by an edit or patched with a new area code, destroyed by explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Visit {
    pub id: String,
    pub pharmacy_name: String,
    pub timestamp: DateTime<Utc>,
    pub customer_contact: Option<String>,
    /// Ordered action labels; duplicates within one visit are kept as-is
    pub actions: Vec<String>,
    pub has_order: bool,
    pub order_details: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    /// Only meaningful when `actions` includes the cold-call marker
    pub lead_rating: Option<LeadRating>,
    /// A single code or none; multi-code strings only exist on rep profiles
    pub area_code: Option<String>,
    /// Creator's display name
    pub user: Option<String>,
    /// Advisory weekday labels, carried from the most recent edit
    #[serde(default)]
    pub best_days: Vec<String>,
}

/// Request body for creating or fully replacing a visit
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VisitPayload {
    #[validate(length(min = 1, message = "Pharmacy name is required"))]
    pub pharmacy_name: String,
    /// Defaults to the current instant when omitted
    pub timestamp: Option<DateTime<Utc>>,
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub has_order: bool,
    pub order_details: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub lead_rating: Option<LeadRating>,
    pub area_code: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub best_days: Vec<String>,
}

impl VisitPayload {
    /// Materialize into a [`Visit`] with the given identifier.
    pub fn into_visit(self, id: String, now: DateTime<Utc>) -> Visit {
        Visit {
            id,
            pharmacy_name: self.pharmacy_name,
            timestamp: self.timestamp.unwrap_or(now),
            customer_contact: self.customer_contact,
            actions: self.actions,
            has_order: self.has_order,
            order_details: self.order_details,
            photo_url: self.photo_url,
            notes: self.notes,
            lead_rating: self.lead_rating,
            area_code: self.area_code,
            user: self.user,
            best_days: self.best_days,
        }
    }
}

/// Request body for the area-code-only patch
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AreaCodePatch {
    #[validate(length(min = 1, message = "Area code is required"))]
    pub area_code: String,
}
