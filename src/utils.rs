use crate::error::{BalanceChainError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Parses a month identifier in the format "YYYY-MM" into (year, month).
pub fn parse_month_identifier(identifier: &str) -> Result<(i32, u32)> {
    let invalid = || BalanceChainError::InvalidPeriodIdentifier(identifier.to_string());

    let parts: Vec<&str> = identifier.split('-').collect();
    if parts.len() != 2 || parts[0].len() != 4 || parts[1].len() != 2 {
        // Strict zero-padded form keeps lexicographic month order chronological.
        return Err(invalid());
    }

    let year: i32 = parts[0].parse().map_err(|_| invalid())?;
    let month: u32 = parts[1].parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((year, month))
}

pub fn month_start_utc(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            BalanceChainError::InvalidPeriodIdentifier(format!("{:04}-{:02}", year, month))
        })
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Parses an ISO-8601 instant (RFC 3339) into a UTC timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| BalanceChainError::TimestampParse(value.to_string()))
}

/// Weekday index with Sunday as 0, Saturday as 6.
pub fn weekday_from_sunday(instant: DateTime<Utc>) -> u32 {
    instant.weekday().num_days_from_sunday()
}

/// The calendar date immediately before a day-aligned exclusive end instant.
/// This is the last date the half-open window covers.
pub fn date_before(exclusive_end: DateTime<Utc>) -> NaiveDate {
    (exclusive_end - Duration::days(1)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_identifier() {
        assert_eq!(parse_month_identifier("2025-01").unwrap(), (2025, 1));
        assert_eq!(parse_month_identifier("1999-12").unwrap(), (1999, 12));
    }

    #[test]
    fn test_parse_month_identifier_rejects_malformed() {
        for bad in ["2025", "2025-13", "2025-00", "2025-1", "2025-1-1", "jan-2025", ""] {
            let result = parse_month_identifier(bad);
            assert!(result.is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_month_start_utc() {
        let start = month_start_utc(2025, 1).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_next_month_wraps_year() {
        assert_eq!(next_month(2025, 1), (2025, 2));
        assert_eq!(next_month(2025, 12), (2026, 1));
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2025-01-17T14:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-17T14:00:00+00:00");

        // Offsets normalize to UTC
        let ts = parse_timestamp("2025-01-17T15:00:00+01:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-17T14:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in ["2025-01-17", "not a time", "2025-01-17T99:00:00Z", ""] {
            assert!(parse_timestamp(bad).is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_weekday_from_sunday() {
        // 2025-01-05 is a Sunday
        let sunday = parse_timestamp("2025-01-05T00:00:00Z").unwrap();
        assert_eq!(weekday_from_sunday(sunday), 0);

        // 2025-01-01 is a Wednesday
        let wednesday = parse_timestamp("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(weekday_from_sunday(wednesday), 3);
    }

    #[test]
    fn test_date_before() {
        let end = parse_timestamp("2025-02-01T00:00:00Z").unwrap();
        assert_eq!(
            date_before(end),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }
}
