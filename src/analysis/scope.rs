//! Area-code access scope resolution

use std::collections::HashSet;

use crate::models::Visit;

/// Profile value meaning "may see every area"
pub const UNRESTRICTED: &str = "All";

/// Set of area codes an identity may see.
///
/// Built from a rep profile string: either the `"All"` sentinel or a
/// comma-joined code list. Membership is an exact string match after
/// trimming; it is deliberately NOT case-folded, unlike pharmacy-name
/// matching elsewhere.
#[derive(Debug, Clone)]
pub enum AccessScope {
    Unrestricted,
    Codes(HashSet<String>),
}

impl AccessScope {
    /// Parse a rep profile string. Empty profiles are unrestricted.
    pub fn parse(profile: &str) -> Self {
        let trimmed = profile.trim();
        if trimmed.is_empty() || trimmed == UNRESTRICTED {
            return AccessScope::Unrestricted;
        }
        let codes = trimmed
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        AccessScope::Codes(codes)
    }

    /// Whether the given visit is visible under this scope.
    ///
    /// A visit without an area code is unscoped/shared and passes every
    /// scope.
    pub fn allows(&self, visit: &Visit) -> bool {
        match self {
            AccessScope::Unrestricted => true,
            AccessScope::Codes(codes) => match visit.area_code.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(code) => codes.contains(code),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn visit_with_area(area: Option<&str>) -> Visit {
        Visit {
            id: "v1".to_string(),
            pharmacy_name: "Test Pharmacy".to_string(),
            timestamp: Utc::now(),
            customer_contact: None,
            actions: vec![],
            has_order: false,
            order_details: None,
            photo_url: None,
            notes: None,
            lead_rating: None,
            area_code: area.map(String::from),
            user: None,
            best_days: vec![],
        }
    }

    #[test]
    fn multi_code_profile_allows_member() {
        let scope = AccessScope::parse("2A, 2B");
        assert!(scope.allows(&visit_with_area(Some("2A"))));
        assert!(scope.allows(&visit_with_area(Some("2B"))));
    }

    #[test]
    fn multi_code_profile_rejects_non_member() {
        let scope = AccessScope::parse("2A, 2B");
        assert!(!scope.allows(&visit_with_area(Some("2C"))));
    }

    #[test]
    fn unscoped_visit_passes_every_scope() {
        let scope = AccessScope::parse("2A");
        assert!(scope.allows(&visit_with_area(None)));
        assert!(scope.allows(&visit_with_area(Some(""))));
    }

    #[test]
    fn all_sentinel_is_unrestricted() {
        let scope = AccessScope::parse("All");
        assert!(scope.allows(&visit_with_area(Some("9Z"))));
        assert!(scope.allows(&visit_with_area(None)));
    }

    #[test]
    fn empty_profile_is_unrestricted() {
        let scope = AccessScope::parse("");
        assert!(scope.allows(&visit_with_area(Some("2C"))));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let scope = AccessScope::parse("2A");
        assert!(!scope.allows(&visit_with_area(Some("2a"))));
    }
}
