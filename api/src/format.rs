//! Display helpers for values the API stores in their raw form.

use crate::scoring::NOT_AVAILABLE;
use crate::wire::parse_timestamp;
use chrono::NaiveDate;

/// Court identifiers the scheduling form offers.
pub const AVAILABLE_COURTS: [&str; 4] = ["court1", "court2", "court3", "court4"];

/// `"court3"` → `"Court 3"`. Anything else passes through.
pub fn format_court(court: &str) -> String {
    match court.strip_prefix("court") {
        Some(rest) => format!("Court {}", rest.trim()),
        None => court.to_owned(),
    }
}

/// Title-case each word: `"mixed doubles"` → `"Mixed Doubles"`.
pub fn format_event_type(event_type: &str) -> String {
    event_type
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_match_number(match_number: &str) -> String {
    match_number.to_uppercase()
}

pub fn format_duration(duration: Option<&str>) -> String {
    match duration.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// `"2024-05-01"` → `"May 1, 2024"`. Also accepts a full timestamp.
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(date).map(|t| t.date()))
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

/// `"2024-05-01T09:05:00"` → `"09:05 AM"`.
pub fn format_time(time: Option<&str>) -> String {
    time.and_then(parse_timestamp)
        .map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

/// `"2024-05-01T09:05:00"` → `"May 1, 2024, 09:05 AM"`.
pub fn format_datetime(datetime: Option<&str>) -> String {
    datetime
        .and_then(parse_timestamp)
        .map(|t| t.format("%b %-d, %Y, %I:%M %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn court_labels() {
        assert_eq!(format_court("court3"), "Court 3");
        assert_eq!(format_court("Centre"), "Centre");
    }

    #[test]
    fn event_type_is_title_cased() {
        assert_eq!(format_event_type("mixed doubles"), "Mixed Doubles");
        assert_eq!(format_event_type("Singles"), "Singles");
    }

    #[test]
    fn missing_values_show_placeholder() {
        assert_eq!(format_duration(None), "N/A");
        assert_eq!(format_duration(Some("  ")), "N/A");
        assert_eq!(format_duration(Some("1h 5m")), "1h 5m");
        assert_eq!(format_time(None), "N/A");
        assert_eq!(format_datetime(Some("garbage")), "N/A");
    }

    #[test]
    fn dates_and_times_use_us_style() {
        assert_eq!(format_date("2024-05-01"), "May 1, 2024");
        assert_eq!(format_time(Some("2024-05-01T21:05:00")), "09:05 PM");
        assert_eq!(format_datetime(Some("2024-05-01 09:05:00")), "May 1, 2024, 09:05 AM");
        assert_eq!(format_match_number("qf-1"), "QF-1");
    }
}
