//! Shorter renderings of second counts used by `status` and `history`.

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationFormatter;

impl DurationFormatter {
    pub fn hours_one_decimal(&self, seconds: i64) -> String {
        format!("{:.1}", seconds.max(0) as f64 / 3_600.)
    }

    /// Signed offset from the limit. Below an hour it's in minutes, otherwise in tenths of an hour.
    pub fn numeric_duration(&self, seconds: i64, is_over: bool) -> String {
        let seconds = seconds.max(0);
        let sign = if is_over { "+" } else { "-" };
        if seconds < 3_600 {
            let minutes = seconds / 60;
            if minutes == 0 {
                return "0m".into();
            }
            return format!("{sign}{minutes}m");
        }

        format!("{sign}{}h", self.hours_one_decimal(seconds))
    }

    pub fn compact_duration(&self, seconds: i64) -> String {
        let seconds = seconds.max(0);
        let hours = seconds / 3_600;
        let minutes = (seconds % 3_600) / 60;
        if hours > 0 {
            format!("{hours}h {minutes:02}m")
        } else {
            format!("{minutes}m")
        }
    }

    pub fn detailed_duration(&self, seconds: i64) -> String {
        let seconds = seconds.max(0);
        format!(
            "{}h {:02}m {:02}s",
            seconds / 3_600,
            (seconds % 3_600) / 60,
            seconds % 60
        )
    }
}
