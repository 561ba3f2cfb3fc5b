//! Time-of-day eligibility for campaigns.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use pacing_domain::{Campaign, DaypartingSchedule};

use crate::error::{CoreError, Result};

/// Stateless dayparting checks.
pub struct DaypartingEvaluator;

impl DaypartingEvaluator {
    /// Returns `true` when `now` lies inside the schedule's window (inclusive, midnight-aware).
    pub fn is_active_now(schedule: &DaypartingSchedule, now: NaiveTime) -> bool {
        schedule.contains(now)
    }

    pub fn parse_timezone(name: &str) -> Result<Tz> {
        name.trim()
            .parse::<Tz>()
            .map_err(|err| CoreError::Validation(format!("unknown timezone `{name}`: {err}")))
    }

    /// Rejects schedules whose timezone cannot be resolved.
    pub fn validate(schedule: &DaypartingSchedule) -> Result<()> {
        Self::parse_timezone(&schedule.timezone).map(|_| ())
    }

    /// Converts a UTC instant into wall-clock time in the schedule's timezone.
    pub fn local_time_of_day(schedule: &DaypartingSchedule, now: DateTime<Utc>) -> Result<NaiveTime> {
        let tz = Self::parse_timezone(&schedule.timezone)?;
        Ok(now.with_timezone(&tz).time())
    }

    /// Campaigns without a schedule may run at any time.
    pub fn is_campaign_in_window(campaign: &Campaign, now: DateTime<Utc>) -> Result<bool> {
        match &campaign.dayparting {
            Some(schedule) => {
                let local = Self::local_time_of_day(schedule, now)?;
                Ok(Self::is_active_now(schedule, local))
            }
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn overnight_scenario() {
        let schedule = DaypartingSchedule::new(t(22, 0), t(6, 0));
        assert!(DaypartingEvaluator::is_active_now(&schedule, t(23, 0)));
        assert!(DaypartingEvaluator::is_active_now(&schedule, t(5, 59)));
        assert!(!DaypartingEvaluator::is_active_now(&schedule, t(12, 0)));
    }

    #[test]
    fn unscheduled_campaign_is_always_eligible() {
        let campaign = Campaign::new("Always on", Uuid::new_v4());
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert!(DaypartingEvaluator::is_campaign_in_window(&campaign, now).unwrap());
    }

    #[test]
    fn window_is_evaluated_in_schedule_timezone() {
        // 14:00 UTC is 09:00 in New York during winter.
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
        let schedule = DaypartingSchedule::new(t(9, 0), t(10, 0)).with_timezone("America/New_York");
        let campaign = Campaign::new("Morning", Uuid::new_v4()).with_dayparting(schedule.clone());

        assert_eq!(
            DaypartingEvaluator::local_time_of_day(&schedule, now).unwrap(),
            t(9, 0)
        );
        assert!(DaypartingEvaluator::is_campaign_in_window(&campaign, now).unwrap());

        let utc_campaign = Campaign::new("Morning UTC", Uuid::new_v4())
            .with_dayparting(DaypartingSchedule::new(t(9, 0), t(10, 0)));
        assert!(!DaypartingEvaluator::is_campaign_in_window(&utc_campaign, now).unwrap());
    }

    #[test]
    fn unknown_timezone_is_a_validation_error() {
        let schedule = DaypartingSchedule::new(t(9, 0), t(17, 0)).with_timezone("Mars/Olympus");
        assert!(matches!(
            DaypartingEvaluator::validate(&schedule),
            Err(CoreError::Validation(_))
        ));
    }
}
