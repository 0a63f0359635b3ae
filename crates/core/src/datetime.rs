//! Parsing of the split date/time strings used in form payloads.
//!
//! Admin clients send `"2024-03-01"` and `"08:30"` separately, in the
//! organization's local offset. Everything downstream works in UTC.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Expected format of the date part.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expected format of the time part (24-hour, minute precision).
pub const TIME_FORMAT: &str = "%H:%M";

/// Build a fixed offset from whole hours east of UTC.
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset, CoreError> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| CoreError::Validation(format!("UTC offset of {hours} hours is out of range")))
}

/// Combine a `YYYY-MM-DD` date and `HH:MM` time in `offset` into a UTC timestamp.
pub fn parse_date_and_time(
    date: &str,
    time: &str,
    offset: FixedOffset,
) -> Result<Timestamp, CoreError> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| CoreError::Validation(format!("Invalid date '{date}': {e}")))?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT)
        .map_err(|e| CoreError::Validation(format!("Invalid time '{time}': {e}")))?;

    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| CoreError::Validation("Ambiguous local date and time".into()))
}
