use ansi_term::Colour;

use crate::{engine::duration::DurationFormatter, storage::day_record::DayRecord};

const HEADER: [&str; 7] = ["Day", "Work", "Break", "Idle", "Total", "Limit", "Over"];

/// One tab separated line per record, in the order given.
pub fn render_history(records: &[DayRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No days recorded yet".into()];
    }

    let formatter = DurationFormatter;
    let minutes = |value: i64| formatter.compact_duration(value.saturating_mul(60));

    let mut lines = vec![HEADER.join("\t")];
    for record in records {
        let totals = record.ritual_totals();
        let over = minutes(record.over_minutes());
        let over = if record.over_minutes() > 0 {
            Colour::Red.paint(over).to_string()
        } else {
            over
        };
        lines.push(
            [
                record.day_id().to_string(),
                minutes(totals.work_minutes),
                minutes(totals.break_minutes),
                minutes(totals.idle_minutes),
                minutes(totals.total_minutes),
                minutes(record.limit_minutes()),
                over,
            ]
            .join("\t"),
        );
    }
    lines
}
