use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub const TRACKING_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a timestamp the way the tracking service expects it (UTC, no offset).
pub fn format_tracking_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format(TRACKING_DATE_FORMAT).to_string())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) or epoch milliseconds.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TRACKING_DATE_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

/// Parse-then-format shortcut for optional string timestamps coming off the wire.
pub fn format_raw_tracking_date(raw: Option<&str>) -> Option<String> {
    format_tracking_date(raw.and_then(parse_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_formats_to_none() {
        assert_eq!(format_tracking_date(None), None);
        assert_eq!(format_raw_tracking_date(None), None);
    }

    #[test]
    fn test_format_is_nineteen_chars() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let formatted = format_tracking_date(Some(date)).unwrap();
        assert_eq!(formatted, "2024-03-07 09:05:01");
        assert_eq!(formatted.len(), 19);
    }

    #[test]
    fn test_offsets_are_converted_to_utc() {
        assert_eq!(
            format_raw_tracking_date(Some("2024-03-07T09:05:01-03:00")).as_deref(),
            Some("2024-03-07 12:05:01")
        );
    }

    #[test]
    fn test_parse_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_date("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_date("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_date(&expected.timestamp_millis().to_string()), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }
}
