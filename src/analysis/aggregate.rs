//! Per-pharmacy rollup aggregation

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::models::{stats::UNKNOWN_CONTACT, PharmacyStats, Visit};

use super::scope::AccessScope;

/// Aggregate a visit set into per-pharmacy rollups.
///
/// Returns the rollups sorted by most recent visit first, plus the distinct
/// user names present in the scoped set. The user list is computed before
/// the optional user filter so filter suggestions always reflect everyone
/// visible to the requester.
pub fn customer_stats(
    visits: &[Visit],
    scope: &AccessScope,
    filter_user: Option<&str>,
) -> (Vec<PharmacyStats>, Vec<String>) {
    let scoped: Vec<&Visit> = visits.iter().filter(|v| scope.allows(v)).collect();

    let users: BTreeSet<String> = scoped
        .iter()
        .filter_map(|v| v.user.clone())
        .filter(|u| !u.is_empty())
        .collect();

    // Group key is the trimmed name, case-sensitive. Case folding is only
    // used for membership checks elsewhere, never for the group key.
    let mut groups: IndexMap<String, Vec<&Visit>> = IndexMap::new();
    for &visit in &scoped {
        groups
            .entry(visit.pharmacy_name.trim().to_string())
            .or_default()
            .push(visit);
    }

    let mut stats: Vec<PharmacyStats> = Vec::new();
    for (name, mut group) in groups {
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(user) = filter_user {
            group.retain(|v| v.user.as_deref() == Some(user));
        }
        let Some(latest) = group.first() else {
            // User filter emptied the group: the pharmacy is dropped, not
            // emitted with zero stats
            continue;
        };

        // Frequency count in group order; the map keeps first-seen insertion
        // order so the stable sort below breaks ties reproducibly
        let mut action_counts: IndexMap<&str, usize> = IndexMap::new();
        for visit in &group {
            for action in &visit.actions {
                *action_counts.entry(action.as_str()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, usize)> = action_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top_actions: Vec<String> = ranked
            .into_iter()
            .take(3)
            .map(|(action, _)| action.to_string())
            .collect();

        let last_contact = latest
            .customer_contact
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string());

        stats.push(PharmacyStats {
            pharmacy_name: name,
            total_visits: group.len(),
            last_visit: latest.timestamp,
            last_contact,
            last_user: latest.user.clone(),
            top_actions,
            lead_rating: group.iter().find_map(|v| v.lead_rating),
            area_code: group.iter().find_map(|v| v.area_code.clone()),
        });
    }

    stats.sort_by(|a, b| b.last_visit.cmp(&a.last_visit));

    (stats, users.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadRating;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn visit(id: &str, pharmacy: &str, day: u32) -> Visit {
        Visit {
            id: id.to_string(),
            pharmacy_name: pharmacy.to_string(),
            timestamp: at(day),
            customer_contact: None,
            actions: vec![],
            has_order: false,
            order_details: None,
            photo_url: None,
            notes: None,
            lead_rating: None,
            area_code: None,
            user: None,
            best_days: vec![],
        }
    }

    #[test]
    fn groups_partition_the_visit_set() {
        let visits = vec![
            visit("1", "Alpha", 1),
            visit("2", " Alpha ", 2),
            visit("3", "Beta", 3),
        ];
        let (stats, _) = customer_stats(&visits, &AccessScope::Unrestricted, None);
        assert_eq!(stats.len(), 2);
        let total: usize = stats.iter().map(|s| s.total_visits).sum();
        assert_eq!(total, visits.len());
    }

    #[test]
    fn group_key_is_case_sensitive() {
        let visits = vec![visit("1", "Alpha", 1), visit("2", "alpha", 2)];
        let (stats, _) = customer_stats(&visits, &AccessScope::Unrestricted, None);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn top_actions_rank_by_frequency_then_first_seen() {
        let mut v1 = visit("1", "Alpha", 2);
        v1.actions = vec!["Stock Check".to_string(), "Phone Call".to_string()];
        let mut v2 = visit("2", "Alpha", 1);
        v2.actions = vec!["Stock Check".to_string()];
        let (stats, _) = customer_stats(&[v1, v2], &AccessScope::Unrestricted, None);
        assert_eq!(stats[0].top_actions, vec!["Stock Check", "Phone Call"]);
    }

    #[test]
    fn top_actions_truncate_to_three() {
        let mut v = visit("1", "Alpha", 1);
        v.actions = vec![
            "Stock Check".to_string(),
            "Phone Call".to_string(),
            "Merchandising".to_string(),
            "Cold Call".to_string(),
        ];
        let (stats, _) = customer_stats(&[v], &AccessScope::Unrestricted, None);
        assert_eq!(stats[0].top_actions.len(), 3);
    }

    #[test]
    fn rollup_fields_come_from_most_recent_visit_with_value() {
        let mut older = visit("1", "Alpha", 1);
        older.lead_rating = Some(LeadRating::High);
        older.area_code = Some("2A".to_string());
        older.customer_contact = Some("Dana".to_string());
        let newer = visit("2", "Alpha", 5);

        let (stats, _) = customer_stats(&[older, newer], &AccessScope::Unrestricted, None);
        let s = &stats[0];
        // Most recent visit has no rating/area, so both come from the older one
        assert_eq!(s.lead_rating, Some(LeadRating::High));
        assert_eq!(s.area_code.as_deref(), Some("2A"));
        // Contact always tracks the most recent visit, falling back to the sentinel
        assert_eq!(s.last_contact, UNKNOWN_CONTACT);
        assert_eq!(s.last_visit, at(5));
    }

    #[test]
    fn user_filter_drops_emptied_pharmacies() {
        let mut mine = visit("1", "Alpha", 1);
        mine.user = Some("Sam".to_string());
        let mut theirs = visit("2", "Beta", 2);
        theirs.user = Some("Alex".to_string());

        let (stats, users) =
            customer_stats(&[mine, theirs], &AccessScope::Unrestricted, Some("Sam"));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].pharmacy_name, "Alpha");
        // Suggestions still list everyone in scope
        assert_eq!(users, vec!["Alex".to_string(), "Sam".to_string()]);
    }

    #[test]
    fn scope_filter_composes_with_grouping() {
        let mut in_scope = visit("1", "Alpha", 1);
        in_scope.area_code = Some("2A".to_string());
        let mut out_of_scope = visit("2", "Beta", 2);
        out_of_scope.area_code = Some("9Z".to_string());
        let shared = visit("3", "Gamma", 3);

        let scope = AccessScope::parse("2A");
        let (stats, _) = customer_stats(&[in_scope, out_of_scope, shared], &scope, None);
        let names: Vec<&str> = stats.iter().map(|s| s.pharmacy_name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha"]);
    }

    #[test]
    fn output_sorted_by_last_visit_descending() {
        let visits = vec![
            visit("1", "Alpha", 1),
            visit("2", "Beta", 9),
            visit("3", "Gamma", 5),
        ];
        let (stats, _) = customer_stats(&visits, &AccessScope::Unrestricted, None);
        let names: Vec<&str> = stats.iter().map(|s| s.pharmacy_name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let (stats, users) = customer_stats(&[], &AccessScope::Unrestricted, None);
        assert!(stats.is_empty());
        assert!(users.is_empty());
    }
}
