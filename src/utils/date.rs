//! Display formatting for stored timestamps.

use chrono::{DateTime, NaiveDate};

/// Format an RFC 3339 timestamp or a bare `YYYY-MM-DD` date as
/// `January 5, 2024`. Returns `None` for anything unparsable.
pub fn display_date(raw: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%B %-d, %Y").to_string())
}

/// Machine-readable form for `<time datetime>`.
pub fn iso_date(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}
