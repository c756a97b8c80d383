//! Clock-in / clock-out arithmetic for timesheet entries.
//!
//! Times are `HH:MM` wall-clock strings. A clock-out earlier than the
//! clock-in is taken to be on the following day.

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::employee::TimesheetEntry;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimesheetError {
    #[error("Invalid time format: {0} (expected HH:MM)")]
    InvalidTime(String),
}

fn minutes_of_day(raw: &str) -> Result<u32, TimesheetError> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| TimesheetError::InvalidTime(raw.to_string()))?;
    Ok(time.hour() * 60 + time.minute())
}

fn worked_minutes(clock_in: &str, clock_out: &str) -> Result<u32, TimesheetError> {
    let start = minutes_of_day(clock_in)?;
    let end = minutes_of_day(clock_out)?;
    Ok((end + MINUTES_PER_DAY - start) % MINUTES_PER_DAY)
}

/// Hours worked, rounded to two decimals.
pub fn calculate_total_hours(clock_in: &str, clock_out: &str) -> Result<f64, TimesheetError> {
    let minutes = worked_minutes(clock_in, clock_out)?;
    Ok((minutes as f64 / 60.0 * 100.0).round() / 100.0)
}

/// `"8 hours 30 minutes"`. Empty when either time is missing.
pub fn format_duration(clock_in: &str, clock_out: &str) -> String {
    if clock_in.is_empty() || clock_out.is_empty() {
        return String::new();
    }

    match worked_minutes(clock_in, clock_out) {
        Ok(minutes) => format!("{} hours {} minutes", minutes / 60, minutes % 60),
        Err(_) => "Invalid time format".to_string(),
    }
}

impl TimesheetEntry {
    /// Entry with `total_hours` derived from the clock times.
    pub fn new(
        work_date: impl Into<String>,
        clock_in: impl Into<String>,
        clock_out: impl Into<String>,
    ) -> Result<Self, TimesheetError> {
        let clock_in = clock_in.into();
        let clock_out = clock_out.into();
        let total_hours = calculate_total_hours(&clock_in, &clock_out)?;
        Ok(Self {
            work_date: work_date.into(),
            clock_in,
            clock_out,
            total_hours,
        })
    }
}
