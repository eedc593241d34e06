//! Data models for FieldLog

pub mod rep;
pub mod stats;
pub mod visit;

// Re-export commonly used types
pub use rep::{DirectoryEntry, RepClaims, RepProfile};
pub use stats::PharmacyStats;
pub use visit::{LeadRating, Visit, VisitPayload};
