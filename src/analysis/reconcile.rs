//! Offline-cache reconciliation

use std::collections::HashSet;

use crate::models::Visit;

/// Merge the remote store result with the local cache for the same view.
///
/// Store entries are authoritative; cache entries are appended only when
/// their ID is absent from the store result (offline-created records that
/// have not propagated yet). An empty store result means the store was
/// unreachable or unconfigured, and the cache alone is returned rather than
/// an error.
pub fn merge_with_local(store: Vec<Visit>, local: &[Visit]) -> Vec<Visit> {
    if store.is_empty() {
        return local.to_vec();
    }

    let mut seen: HashSet<String> = store.iter().map(|v| v.id.clone()).collect();
    let mut merged = store;
    for visit in local {
        if seen.insert(visit.id.clone()) {
            merged.push(visit.clone());
        }
    }
    merged
}
