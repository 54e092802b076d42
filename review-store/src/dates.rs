//! Review date parsing.
//!
//! Store providers emit several date shapes. Parsers are tried in order and the
//! first success wins; every parser returns UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

type DateParser = fn(&str) -> Option<DateTime<Utc>>;

/// Ordered parser list: ISO-8601, `"March 5, 2025"`, `"5 March 2025"`, `"2025-03-05"`.
const PARSERS: [DateParser; 4] = [
    parse_iso8601,
    parse_month_day_year,
    parse_day_month_year,
    parse_year_month_day,
];

/// Seconds added to a day-start timestamp to reach the day's last second.
pub const END_OF_DAY_SECS: i64 = 86_399;

/// Parses any supported date shape. Empty input yields `None`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|p| p(v))
}

/// `YYYY-MM-DD` rendering used for stored review dates.
pub fn format_day(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// ISO-8601 date-time (trailing `Z` or explicit offset); offset-less values
/// and bare dates are read as UTC.
fn parse_iso8601(v: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(v, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .ok()
                .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
        })
}

fn parse_month_day_year(v: &str) -> Option<DateTime<Utc>> {
    parse_calendar_day(v, "%B %d, %Y")
}

fn parse_day_month_year(v: &str) -> Option<DateTime<Utc>> {
    parse_calendar_day(v, "%d %B %Y")
}

fn parse_year_month_day(v: &str) -> Option<DateTime<Utc>> {
    parse_calendar_day(v, "%Y-%m-%d")
}

fn parse_calendar_day(v: &str, fmt: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(v, fmt)
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_shape_lands_on_the_same_day() {
        for raw in [
            "2025-11-01T08:15:00Z",
            "November 1, 2025",
            "1 November 2025",
            "2025-11-01",
        ] {
            let dt = parse_date(raw).unwrap_or_else(|| panic!("failed to parse {raw}"));
            assert_eq!(format_day(&dt), "2025-11-01", "input {raw}");
        }
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        let dt = parse_date("2025-11-01T02:00:00+05:30").unwrap();
        assert_eq!(format_day(&dt), "2025-10-31");
    }

    #[test]
    fn naive_datetimes_are_utc() {
        let dt = parse_date("2025-11-01T10:00:00").unwrap();
        assert_eq!(dt.timestamp(), 1_761_991_200);
    }

    #[test]
    fn garbage_and_empty_are_none() {
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2025-13-45").is_none());
    }
}
