//! Positional row codec for the visit sheet.
//!
//! Rows arrive as ragged string arrays from manually edited spreadsheets, so
//! decoding validates shape per row and surfaces an error for rows it cannot
//! interpret instead of silently misaligning fields. Dates are normalized
//! with a lossy-but-total fallback chain because aggregation must stay total
//! over arbitrary historical data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{DirectoryEntry, LeadRating, Visit};

/// Column layout of the visit sheet (A:M)
pub const COLUMN_COUNT: usize = 13;
/// Minimum columns a row needs to be decodable: id, timestamp, pharmacy name
const MIN_COLUMNS: usize = 3;
/// Value in the ID column marking the header row
pub const HEADER_SENTINEL: &str = "ID";
/// Value in the first directory column marking its header row
pub const DIRECTORY_HEADER_SENTINEL: &str = "Area Code";
/// Spreadsheet column letter holding the area code (for single-cell patches)
pub const AREA_CODE_COLUMN_LETTER: &str = "K";

const COL_ID: usize = 0;
const COL_TIMESTAMP: usize = 1;
const COL_PHARMACY: usize = 2;
const COL_CONTACT: usize = 3;
const COL_ACTIONS: usize = 4;
const COL_HAS_ORDER: usize = 5;
const COL_ORDER_DETAILS: usize = 6;
const COL_PHOTO_URL: usize = 7;
const COL_NOTES: usize = 8;
const COL_LEAD_RATING: usize = 9;
const COL_AREA_CODE: usize = 10;
const COL_USER: usize = 11;
const COL_BEST_DAYS: usize = 12;

/// Why a row could not be decoded into a [`Visit`]
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row {index} has {found} columns, expected at least {MIN_COLUMNS}")]
    TooShort { index: usize, found: usize },
    #[error("row {index} has no pharmacy name")]
    MissingName { index: usize },
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn opt_cell(row: &[String], idx: usize) -> Option<String> {
    let value = cell(row, idx);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn list_cell(row: &[String], idx: usize) -> Vec<String> {
    let value = cell(row, idx);
    if value.is_empty() {
        Vec::new()
    } else {
        value.split(", ").map(String::from).collect()
    }
}

/// Whether this row is the sheet header
pub fn is_header(row: &[String]) -> bool {
    cell(row, COL_ID) == HEADER_SENTINEL
}

/// Whether an ID cell literally equals the header sentinel. Such rows are
/// skipped wherever they appear, not only at index 0.
pub fn is_header_id(id: &str) -> bool {
    matches!(id, "ID" | "id")
}

/// Decode one sheet row into a [`Visit`].
///
/// `index` is the absolute row index in the sheet; it seeds the placeholder
/// ID (`generated-<index>`) assigned when the ID column is empty so manually
/// added rows are not silently dropped. `fallback_now` is the instant used
/// when the timestamp cell is beyond salvage.
pub fn decode_row(
    row: &[String],
    index: usize,
    fallback_now: DateTime<Utc>,
) -> Result<Visit, RowError> {
    if row.len() < MIN_COLUMNS {
        return Err(RowError::TooShort {
            index,
            found: row.len(),
        });
    }

    let pharmacy_name = cell(row, COL_PHARMACY);
    if pharmacy_name.trim().is_empty() {
        return Err(RowError::MissingName { index });
    }

    let id = match cell(row, COL_ID) {
        "" => format!("generated-{}", index),
        id => id.to_string(),
    };

    Ok(Visit {
        id,
        pharmacy_name: pharmacy_name.to_string(),
        timestamp: parse_timestamp(cell(row, COL_TIMESTAMP), fallback_now),
        customer_contact: opt_cell(row, COL_CONTACT),
        actions: list_cell(row, COL_ACTIONS),
        has_order: cell(row, COL_HAS_ORDER) == "Yes",
        order_details: opt_cell(row, COL_ORDER_DETAILS),
        photo_url: opt_cell(row, COL_PHOTO_URL),
        notes: opt_cell(row, COL_NOTES),
        lead_rating: LeadRating::from_cell(cell(row, COL_LEAD_RATING)),
        area_code: opt_cell(row, COL_AREA_CODE),
        user: opt_cell(row, COL_USER),
        best_days: list_cell(row, COL_BEST_DAYS),
    })
}

/// Flatten a [`Visit`] into its sheet row
pub fn encode_row(visit: &Visit) -> Vec<String> {
    vec![
        visit.id.clone(),
        visit
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        visit.pharmacy_name.clone(),
        visit.customer_contact.clone().unwrap_or_default(),
        visit.actions.join(", "),
        if visit.has_order { "Yes" } else { "No" }.to_string(),
        visit.order_details.clone().unwrap_or_default(),
        visit.photo_url.clone().unwrap_or_default(),
        visit.notes.clone().unwrap_or_default(),
        visit
            .lead_rating
            .map(|r| r.as_str().to_string())
            .unwrap_or_default(),
        visit.area_code.clone().unwrap_or_default(),
        visit.user.clone().unwrap_or_default(),
        visit.best_days.join(", "),
    ]
}

/// Decode one rep-directory row (`Area Code | User | PIN`).
///
/// Rows without both a name and a PIN are unusable credentials and yield
/// `None`.
pub fn decode_directory_row(row: &[String]) -> Option<DirectoryEntry> {
    let name = cell(row, 1).trim();
    let pin = cell(row, 2).trim();
    if name.is_empty() || pin.is_empty() {
        return None;
    }
    Some(DirectoryEntry {
        area_code: cell(row, 0).trim().to_string(),
        name: name.to_string(),
        pin: pin.to_string(),
    })
}

/// Whether this row is the directory sheet header
pub fn is_directory_header(row: &[String]) -> bool {
    cell(row, 0) == DIRECTORY_HEADER_SENTINEL
}

static DIGIT_GROUPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Normalize a timestamp cell into an instant.
///
/// 1. Standard instant parses: RFC 3339, then naive ISO date-time, then an
///    ISO date alone at midnight UTC.
/// 2. Exactly three digit groups are read as day/month/year (human
///    "DD/MM/YYYY" convention, any separator), with 2-digit years mapped
///    into the 2000s. Invalid calendar dates are rejected.
/// 3. Anything else falls back to `fallback` with a logged warning. Lossy,
///    but aggregation must never fail on a bad cell.
///
/// Total over arbitrary input and idempotent on already-normalized strings.
pub fn parse_timestamp(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.and_utc();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc();
        }
    }

    let groups: Vec<&str> = DIGIT_GROUPS.find_iter(raw).map(|m| m.as_str()).collect();
    if let [day, month, year] = groups.as_slice() {
        let parsed = (
            day.parse::<u32>().ok(),
            month.parse::<u32>().ok(),
            year.parse::<i32>().ok(),
        );
        if let (Some(day), Some(month), Some(mut year)) = parsed {
            if year < 100 {
                year += 2000;
            }
            if let Some(dt) = NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
            {
                return dt.and_utc();
            }
        }
    }

    tracing::warn!("Invalid date format encountered: {:?}; using fallback", raw);
    fallback
}
