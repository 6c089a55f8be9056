//! Flexible parsing of persisted and source timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a timestamp into UTC, accepting the formats seen across sources
/// and persisted datasets.
///
/// Accepts RFC 3339 (including a `Z` suffix or an explicit offset), a naive
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC) and a bare `YYYY-MM-DD` date
/// (midnight UTC). Anything else is `None`; callers treat a missing
/// timestamp as not fresh, failing toward re-ingestion.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn rfc3339_with_zulu_suffix() {
        let parsed = parse_utc("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn rfc3339_with_offset_converts_to_utc() {
        let parsed = parse_utc("2024-03-01T10:30:00-05:00").unwrap();
        assert_eq!(parsed.hour(), 15);
    }

    #[test]
    fn naive_datetime_is_taken_as_utc() {
        let parsed = parse_utc("2024-03-01 10:30:00").unwrap();
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let parsed = parse_utc("2024-03-01").unwrap();
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_utc("not a date"), None);
        assert_eq!(parse_utc(""), None);
    }
}
