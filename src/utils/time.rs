use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// This is the standard way of converting a sundown day into a record key.
pub fn format_day_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses `HH:MM` into minutes from midnight.
pub fn parse_clock_time(value: &str) -> Result<i64> {
    let (hours, minutes) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected time as HH:MM, got {value:?}"))?;
    let hours = hours.parse::<i64>()?;
    let minutes = minutes.parse::<i64>()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(anyhow!("Time {value:?} must be between 00:00 and 23:59"));
    }
    Ok(hours * 60 + minutes)
}

pub fn format_clock_time(minutes_from_midnight: i64) -> String {
    format!(
        "{:02}:{:02}",
        minutes_from_midnight / 60,
        minutes_from_midnight % 60
    )
}
