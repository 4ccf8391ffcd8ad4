use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Milliseconds since the Unix epoch to a naive UTC datetime
pub fn datetime_from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Truncate to whole milliseconds so values that went through a workbook compare equal
pub fn truncate_to_millis(dt: NaiveDateTime) -> NaiveDateTime {
    DateTime::from_timestamp_millis(dt.and_utc().timestamp_millis())
        .map(|d| d.naive_utc())
        .unwrap_or(dt)
}

/// Parse a timestamp that ended up as text in a sheet
pub fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
