/// Date-cell parsing for the date-edit write-back path.
///
/// Host date columns arrive as epoch timestamps (seconds or milliseconds),
/// `YYYY-MM-DD` strings, or ISO datetimes. Unparsable input is "no change",
/// never an error: the host-side variable is simply not set.
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::types::CellValue;

static ALL_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static PLAIN_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Parse a host cell as a calendar date.
pub fn parse_date_value(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(n) => parse_timestamp(*n),
        CellValue::Text(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parse a string as a calendar date. Accepts all-digit epoch timestamps,
/// `YYYY-MM-DD`, and ISO datetimes (date part taken as written). Invalid
/// calendar dates (e.g. `2024-02-30`) are rejected, not rolled over.
pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if ALL_DIGITS_RE.is_match(trimmed) {
        return trimmed.parse::<f64>().ok().and_then(parse_timestamp);
    }

    if PLAIN_DATE_RE.is_match(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }

    // ISO datetime: the date part is what the host means, regardless of the
    // trailing time or offset.
    if let Some((date_part, _)) = trimmed.split_once('T') {
        if PLAIN_DATE_RE.is_match(date_part) {
            return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
        }
    }

    None
}

/// Epoch timestamp to calendar date. Values below 1e10 are seconds, larger
/// ones milliseconds (the host emits both). The date is taken in UTC, which
/// matches how the host serializes date-only cells (midnight UTC).
fn parse_timestamp(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let millis = if value < 1e10 { value * 1000.0 } else { value };
    let dt: DateTime<chrono::Utc> = DateTime::from_timestamp_millis(millis as i64)?;
    Some(dt.date_naive())
}

/// Render a date for a host variable write.
pub fn format_for_host(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
