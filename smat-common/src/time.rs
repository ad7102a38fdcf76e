//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current date in the server's local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Long-form date used in report headers, e.g. "March 05, 2025"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Compact date used in download filenames, e.g. "20250305"
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Timestamp used in generated documents, e.g. "March 05, 2025 at 02:30 PM"
pub fn long_timestamp(at: DateTime<Local>) -> String {
    at.format("%B %d, %Y at %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_long_date_zero_pads_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(long_date(date), "March 05, 2025");
    }

    #[test]
    fn test_compact_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(compact_date(date), "20241130");
    }

    #[test]
    fn test_long_timestamp_uses_twelve_hour_clock() {
        let at = Local.with_ymd_and_hms(2025, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(long_timestamp(at), "March 05, 2025 at 02:30 PM");
    }
}
