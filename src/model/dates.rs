//! Timestamp display for report cells and meta lines.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DISPLAY_FORMAT: &str = "%b %-d, %Y";

/// Format an issue-tracker timestamp as `Jan 5, 2024`.
///
/// The date is taken in the timestamp's own offset. Missing or empty values
/// show as `N/A`; values that do not parse are shown verbatim.
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return "N/A".to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    // Jira style: 2024-01-05T10:15:00.000+0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format(DISPLAY_FORMAT).to_string();
    }

    raw.to_string()
}

/// Cell renderer for timestamp columns.
pub fn render_date(value: &Value) -> String {
    match value {
        Value::String(s) => format_date(Some(s.as_str())),
        Value::Null => format_date(None),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rfc3339() {
        assert_eq!(format_date(Some("2024-01-05T10:15:00Z")), "Jan 5, 2024");
        assert_eq!(format_date(Some("2023-11-30T23:59:59-05:00")), "Nov 30, 2023");
    }

    #[test]
    fn formats_tracker_offsets_without_colon() {
        assert_eq!(format_date(Some("2024-03-12T08:00:00.000+0000")), "Mar 12, 2024");
    }

    #[test]
    fn formats_plain_dates() {
        assert_eq!(format_date(Some("2022-07-04")), "Jul 4, 2022");
    }

    #[test]
    fn missing_is_not_available() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("  ")), "N/A");
        assert_eq!(render_date(&Value::Null), "N/A");
    }

    #[test]
    fn garbage_is_shown_verbatim() {
        assert_eq!(format_date(Some("last tuesday")), "last tuesday");
    }
}
