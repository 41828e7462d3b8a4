//! Time utilities: parsing timestamps, elapsed minutes, formatting minutes.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD HH:MM` taken as UTC.
pub fn parse_datetime(s: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::InvalidDate(s.to_string()))
}

pub fn parse_optional_datetime(input: Option<&String>) -> AppResult<Option<DateTime<Utc>>> {
    input.map(|s| parse_datetime(s)).transpose()
}

/// Whole minutes from `start` to `end`, floored. Negative when `end < start`.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    ms.div_euclid(60_000)
}

pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn minutes_are_floored() {
        let start = base();
        assert_eq!(minutes_between(start, start), 0);
        assert_eq!(minutes_between(start, start + Duration::seconds(59)), 0);
        assert_eq!(minutes_between(start, start + Duration::seconds(60)), 1);
        assert_eq!(minutes_between(start, start + Duration::minutes(5)), 5);
    }

    #[test]
    fn minutes_can_be_negative() {
        let start = base();
        assert_eq!(minutes_between(start, start - Duration::minutes(2)), -2);
        assert_eq!(minutes_between(start, start - Duration::seconds(1)), -1);
    }

    #[test]
    fn parse_accepts_rfc3339_and_short_form() {
        assert_eq!(parse_datetime("2025-03-10T09:00:00Z").unwrap(), base());
        assert_eq!(parse_datetime("2025-03-10T10:00:00+01:00").unwrap(), base());
        assert_eq!(parse_datetime("2025-03-10 09:00").unwrap(), base());
        assert!(matches!(
            parse_datetime("10/03/2025"),
            Err(AppError::InvalidDate(_))
        ));
    }
}
