//! Overdue-visit classification

use chrono::{DateTime, Months, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::PharmacyStats;

/// Area label for stats that carry no area code
pub const UNASSIGNED_AREA: &str = "Unassigned";

/// Pharmacies of one area within an urgency tier
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaGroup {
    pub area_code: String,
    pub entries: Vec<PharmacyStats>,
}

/// Urgency tiers, each chunked by area code for presentation
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct OverdueReport {
    pub urgent: Vec<AreaGroup>,
    pub warning: Vec<AreaGroup>,
    pub soon: Vec<AreaGroup>,
}

/// Bucket pharmacies by how long ago their last visit happened.
///
/// urgent: more than 6 months before `now`; warning: more than 3; soon: more
/// than 1. Anything visited within the last month is not surfaced at all.
/// Buckets are mutually exclusive and checked in priority order, so a
/// pharmacy 7 months overdue lands only in `urgent`. Within a bucket the
/// most-overdue pharmacies come first; area grouping happens after the tier
/// split and does not affect it.
pub fn classify_overdue(stats: &[PharmacyStats], now: DateTime<Utc>) -> OverdueReport {
    let cutoffs = (
        now.checked_sub_months(Months::new(6)),
        now.checked_sub_months(Months::new(3)),
        now.checked_sub_months(Months::new(1)),
    );
    let (Some(urgent_cutoff), Some(warning_cutoff), Some(soon_cutoff)) = cutoffs else {
        return OverdueReport::default();
    };

    let mut urgent: Vec<PharmacyStats> = Vec::new();
    let mut warning: Vec<PharmacyStats> = Vec::new();
    let mut soon: Vec<PharmacyStats> = Vec::new();

    for s in stats {
        if s.last_visit < urgent_cutoff {
            urgent.push(s.clone());
        } else if s.last_visit < warning_cutoff {
            warning.push(s.clone());
        } else if s.last_visit < soon_cutoff {
            soon.push(s.clone());
        }
    }

    for bucket in [&mut urgent, &mut warning, &mut soon] {
        bucket.sort_by(|a, b| a.last_visit.cmp(&b.last_visit));
    }

    OverdueReport {
        urgent: group_by_area(urgent),
        warning: group_by_area(warning),
        soon: group_by_area(soon),
    }
}

fn group_by_area(entries: Vec<PharmacyStats>) -> Vec<AreaGroup> {
    let mut groups: IndexMap<String, Vec<PharmacyStats>> = IndexMap::new();
    for s in entries {
        let key = s
            .area_code
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNASSIGNED_AREA.to_string());
        groups.entry(key).or_default().push(s);
    }
    groups
        .into_iter()
        .map(|(area_code, entries)| AreaGroup { area_code, entries })
        .collect()
}
