use crate::error::Result;
use crate::utils::{
    date_before, month_start_utc, next_month, parse_month_identifier, weekday_from_sunday,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// A half-open time window: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// One weekly sub-window of a month, identified by its week-ending date
/// (the last calendar date the window covers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub window: PeriodWindow,
    pub week_ending: NaiveDate,
}

/// Builds the calendar-month window for an identifier like "2025-01":
/// first instant of the month through the first instant of the next month.
pub fn month_window(identifier: &str) -> Result<PeriodWindow> {
    let (year, month) = parse_month_identifier(identifier)?;
    let (next_year, next_mo) = next_month(year, month);

    Ok(PeriodWindow {
        start: month_start_utc(year, month)?,
        end: month_start_utc(next_year, next_mo)?,
    })
}

/// Partitions a month window into contiguous, non-overlapping weekly windows
/// that cover it exhaustively.
///
/// Weeks end on Sundays: each window's exclusive end is the instant after the
/// next Sunday, clipped to the month boundary. A cursor already on a Sunday
/// runs a full seven days to the next Sunday rather than closing same-day, so
/// a month starting on a Sunday gets an eight-day first week. The first and
/// last weeks may be short when the month does not align to week boundaries.
pub fn weekly_partition(month: &PeriodWindow) -> Vec<WeekWindow> {
    let mut weeks = Vec::new();
    let mut cursor = month.start;

    while cursor < month.end {
        let weekday = weekday_from_sunday(cursor);
        let days_to_sunday = if weekday == 0 { 7 } else { 7 - weekday };

        let tentative_end = cursor + Duration::days(i64::from(days_to_sunday));
        let end = (tentative_end + Duration::days(1)).min(month.end);

        weeks.push(WeekWindow {
            window: PeriodWindow { start: cursor, end },
            week_ending: date_before(end),
        });

        cursor = end;
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_window_boundaries() {
        let window = month_window("2025-01").unwrap();
        assert_eq!(window.start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(window.end.to_rfc3339(), "2025-02-01T00:00:00+00:00");

        let december = month_window("2025-12").unwrap();
        assert_eq!(december.end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_month_window_rejects_malformed() {
        assert!(month_window("2025-13").is_err());
        assert!(month_window("garbage").is_err());
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let window = month_window("2025-01").unwrap();
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_weekly_partition_mid_week_start() {
        // January 2025 starts on a Wednesday and ends on a Friday.
        let month = month_window("2025-01").unwrap();
        let weeks = weekly_partition(&month);

        let endings: Vec<NaiveDate> = weeks.iter().map(|w| w.week_ending).collect();
        assert_eq!(
            endings,
            vec![
                ymd(2025, 1, 5),
                ymd(2025, 1, 12),
                ymd(2025, 1, 19),
                ymd(2025, 1, 26),
                ymd(2025, 1, 31),
            ]
        );
    }

    #[test]
    fn test_weekly_partition_sunday_start_has_long_first_week() {
        // June 2025 starts on a Sunday: the first week runs a full cycle to
        // the next Sunday instead of closing the same day.
        let month = month_window("2025-06").unwrap();
        let weeks = weekly_partition(&month);

        let endings: Vec<NaiveDate> = weeks.iter().map(|w| w.week_ending).collect();
        assert_eq!(
            endings,
            vec![
                ymd(2025, 6, 8),
                ymd(2025, 6, 15),
                ymd(2025, 6, 22),
                ymd(2025, 6, 29),
                ymd(2025, 6, 30),
            ]
        );

        let first = &weeks[0].window;
        assert_eq!((first.end - first.start).num_days(), 8);
    }

    #[test]
    fn test_weekly_partition_covers_month_exactly() {
        for identifier in ["2025-01", "2025-02", "2025-06", "2024-02", "2025-12"] {
            let month = month_window(identifier).unwrap();
            let weeks = weekly_partition(&month);

            assert_eq!(weeks.first().unwrap().window.start, month.start);
            assert_eq!(weeks.last().unwrap().window.end, month.end);

            for pair in weeks.windows(2) {
                assert_eq!(
                    pair[0].window.end, pair[1].window.start,
                    "weeks must be contiguous in {}",
                    identifier
                );
            }
        }
    }

    #[test]
    fn test_weekly_partition_clips_last_week() {
        // February 2025 ends on a Friday; the last week is short.
        let month = month_window("2025-02").unwrap();
        let weeks = weekly_partition(&month);

        let last = weeks.last().unwrap();
        assert_eq!(last.week_ending, ymd(2025, 2, 28));
        assert!((last.window.end - last.window.start).num_days() < 7);
    }
}
