//! Backend timestamp handling
//!
//! The API emits ISO-8601 datetimes, sometimes with an offset and sometimes
//! naive (`2024-05-01T10:00:00.123456`). Both are normalized to `NaiveDateTime`
//! in UTC.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp string
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// `MMM dd, yyyy, h:mm a` style used across panels
pub fn format_long(ts: &NaiveDateTime) -> String {
    ts.format("%b %d, %Y, %-I:%M %p").to_string()
}

/// Compact label for chart axes
pub fn format_short(ts: &NaiveDateTime) -> String {
    ts.format("%b %d %H:%M").to_string()
}

pub fn format_optional(ts: Option<&NaiveDateTime>) -> String {
    ts.map(format_long).unwrap_or_else(|| "N/A".to_string())
}

/// Serde adapter for optional timestamp fields; unparseable values become `None`
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}
