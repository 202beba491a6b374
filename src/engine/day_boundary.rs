use chrono::{DateTime, Local, TimeZone, Timelike, Utc};

use crate::utils::time::format_day_id;

pub const MAX_RESET_MINUTES: i64 = 1_439;

/// Maps a moment to the sundown day containing it. A sundown day starts at the configured reset
/// time instead of midnight, so `01:30` with a `04:00` reset still belongs to the previous day.
#[derive(Debug, Clone, Copy)]
pub struct DayBoundary<Tz: TimeZone = Local> {
    timezone: Tz,
}

impl DayBoundary<Local> {
    pub fn new() -> Self {
        Self { timezone: Local }
    }
}

impl Default for DayBoundary<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> DayBoundary<Tz> {
    pub fn with_timezone(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Returns `YYYY-MM-DD` of the sundown day for `timestamp`.
    ///
    /// The reset offset is clamped to `[0, 1439]`. Minutes since local midnight are compared with
    /// the offset and the calendar date is shifted by a whole day when the moment lies before the
    /// reset. Subtracting the offset from the timestamp is not equivalent around DST changes.
    pub fn day_id(&self, timestamp: DateTime<Utc>, reset_minutes_from_midnight: i64) -> String {
        let reset = reset_minutes_from_midnight.clamp(0, MAX_RESET_MINUTES);
        let local = timestamp.with_timezone(&self.timezone);
        let minutes_since_midnight = i64::from(local.hour() * 60 + local.minute());

        let date = local.date_naive();
        let day = if minutes_since_midnight < reset {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        };

        format_day_id(day)
    }
}
