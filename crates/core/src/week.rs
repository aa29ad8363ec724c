//! Week arithmetic (weeks start on Monday)

use crate::plan::DayOfWeek;
use crate::store::StoreError;
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Monday of the week containing `date`
///
/// Sunday belongs to the week that started six days earlier.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Monday of the current local week
pub fn current_week_start() -> NaiveDate {
    week_start_for(Local::now().date_naive())
}

/// Calendar date of `day` in the week starting at `week_start`
pub fn date_for_day(week_start: NaiveDate, day: DayOfWeek) -> NaiveDate {
    week_start + Duration::days(day.index() as i64)
}

/// Parse a `YYYY-MM-DD` week reference, normalizing it to its Monday
pub fn parse_week_start(s: &str) -> Result<NaiveDate, StoreError> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| StoreError::InvalidKey(format!("invalid week date '{}': {}", s, e)))?;
    Ok(week_start_for(date))
}
