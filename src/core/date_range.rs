//! Reporting windows.
//!
//! Windows are kept as `YYYY-MM-DD` strings because both upstream APIs
//! accept them verbatim and window membership is decided by plain string
//! comparison against the ISO-8601 timestamps those APIs return.

use chrono::{Datelike, Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// An inclusive reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the window (YYYY-MM-DD)
    pub from: String,
    /// Last day of the window (YYYY-MM-DD)
    pub to: String,
}

impl DateRange {
    /// Create a window from two date strings.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }

    /// Monday to Friday of the current local week.
    pub fn current_week() -> Self {
        Self::work_week_of(Local::now().date_naive())
    }

    /// Monday to Friday of the week containing `day`.
    pub fn work_week_of(day: NaiveDate) -> Self {
        let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
        let friday = monday + Duration::days(4);
        Self::new(monday.format("%Y-%m-%d").to_string(), friday.format("%Y-%m-%d").to_string())
    }

    /// Whether `timestamp` falls inside the window, inclusive on both ends.
    ///
    /// This is a lexical comparison. A full timestamp on the `to` day
    /// (`2026-02-07T10:00:00Z`) sorts after `2026-02-07` and is therefore
    /// outside the window.
    pub fn contains(&self, timestamp: &str) -> bool {
        timestamp >= self.from.as_str() && timestamp <= self.to.as_str()
    }

    /// Check that both ends are well-formed calendar dates.
    pub fn validate(&self) -> anyhow::Result<()> {
        for value in [&self.from, &self.to] {
            if !is_valid_date(value) {
                anyhow::bail!("Invalid date '{}'. Use YYYY-MM-DD", value);
            }
        }
        Ok(())
    }
}

/// Whether `value` is a `YYYY-MM-DD` string naming a real calendar day.
pub fn is_valid_date(value: &str) -> bool {
    DATE_SHAPE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_week_from_midweek() {
        let wednesday = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let range = DateRange::work_week_of(wednesday);
        assert_eq!(range, DateRange::new("2026-02-02", "2026-02-06"));
    }

    #[test]
    fn test_work_week_from_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let range = DateRange::work_week_of(sunday);
        assert_eq!(range.from, "2026-02-02");
        assert_eq!(range.to, "2026-02-06");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new("2026-02-01", "2026-02-07");
        assert!(range.contains("2026-02-01"));
        assert!(range.contains("2026-02-03T12:00:00.000Z"));
        assert!(range.contains("2026-02-07"));
        assert!(!range.contains("2026-01-31T23:59:59.000Z"));
    }

    #[test]
    fn test_contains_excludes_timestamps_on_last_day() {
        let range = DateRange::new("2026-02-01", "2026-02-07");
        assert!(!range.contains("2026-02-07T09:00:00.000Z"));
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2026-02-28"));
        assert!(!is_valid_date("2026-02-30"));
        assert!(!is_valid_date("2026-2-3"));
        assert!(!is_valid_date("03/02/2026"));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn test_validate_reports_bad_end() {
        let range = DateRange::new("2026-02-01", "tomorrow");
        let err = range.validate().unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }
}
