//! Pure reporting core: access scoping, offline reconciliation, per-pharmacy
//! aggregation and overdue classification.
//!
//! Everything in this module is a synchronous function over an in-memory
//! snapshot; clocks and store contents are always passed in by the caller.

pub mod aggregate;
pub mod overdue;
pub mod reconcile;
pub mod scope;

pub use aggregate::customer_stats;
pub use overdue::{classify_overdue, AreaGroup, OverdueReport};
pub use reconcile::merge_with_local;
pub use scope::AccessScope;
