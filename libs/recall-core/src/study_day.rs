//! Study-day handling for the daily reset hour.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

/// The calendar day reviews count towards at `now` (UTC).
///
/// Before `daily_reset_hour` the study day is still the previous date, so a
/// late-night session is scheduled against the day it started in.
pub fn study_day(now: DateTime<Utc>, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// Current study day by the system clock.
pub fn today(daily_reset_hour: u32) -> NaiveDate {
    study_day(Utc::now(), daily_reset_hour)
}
