//! Recurring time-of-day windows (dayparting).

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Restricts a campaign to a daily window, evaluated in `timezone`.
///
/// A window whose start is later than its end wraps past midnight
/// (`22:00-06:00` covers late evening and early morning).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaypartingSchedule {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "DaypartingSchedule::default_timezone")]
    pub timezone: String,
}

impl DaypartingSchedule {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            timezone: Self::default_timezone(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start_time > self.end_time
    }

    /// Returns `true` when `now` falls inside the window. Both ends are inclusive.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.wraps_midnight() {
            now >= self.start_time || now <= self.end_time
        } else {
            self.start_time <= now && now <= self.end_time
        }
    }

    fn default_timezone() -> String {
        DEFAULT_TIMEZONE.to_string()
    }
}

impl fmt::Display for DaypartingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            self.timezone
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn same_day_window_is_inclusive() {
        let schedule = DaypartingSchedule::new(t(9, 0), t(17, 0));
        assert!(schedule.contains(t(9, 0)));
        assert!(schedule.contains(t(12, 30)));
        assert!(schedule.contains(t(17, 0)));
        assert!(!schedule.contains(t(8, 59)));
        assert!(!schedule.contains(t(17, 1)));
    }

    #[test]
    fn overnight_window_wraps_midnight() {
        let schedule = DaypartingSchedule::new(t(22, 0), t(6, 0));
        assert!(schedule.wraps_midnight());
        assert!(schedule.contains(t(23, 0)));
        assert!(schedule.contains(t(0, 0)));
        assert!(schedule.contains(t(5, 59)));
        assert!(schedule.contains(t(22, 0)));
        assert!(schedule.contains(t(6, 0)));
        assert!(!schedule.contains(t(12, 0)));
        assert!(!schedule.contains(t(21, 59)));
    }

    #[test]
    fn zero_length_window_contains_only_its_instant() {
        let schedule = DaypartingSchedule::new(t(10, 0), t(10, 0));
        assert!(schedule.contains(t(10, 0)));
        assert!(!schedule.contains(t(10, 1)));
    }

    #[test]
    fn timezone_defaults_to_utc_when_omitted() {
        let schedule: DaypartingSchedule =
            serde_json::from_str(r#"{"start_time":"09:00:00","end_time":"17:00:00"}"#).unwrap();
        assert_eq!(schedule.timezone, DEFAULT_TIMEZONE);
        assert_eq!(schedule.to_string(), "09:00 - 17:00 (UTC)");
    }
}
