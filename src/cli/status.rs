use ansi_term::Colour;
use chrono::{DateTime, Utc};

use crate::{
    engine::{duration::DurationFormatter, worktime::WorktimeStateFormatter, TimeEngine},
    settings::PersistedSettings,
    storage::status::StatusSnapshot,
};

/// Renders `status` output. The gate is evaluated from the current settings rather than from the
/// snapshot, so configuration changes show up even without a running daemon.
pub fn render_status(
    settings: &PersistedSettings,
    snapshot: Option<&StatusSnapshot>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let gate = TimeEngine::new().gate_state(settings);
    let mut lines = vec![gate.message().to_string()];
    if !gate.is_allowed() {
        lines.push("Configure it with `sundown config set`".into());
        return lines;
    }

    let Some(snapshot) = snapshot.filter(|snapshot| !snapshot.is_stale(now)) else {
        lines.push("Daemon is not running. Start it with `sundown init`".into());
        return lines;
    };

    if let Some(day_id) = &snapshot.day_id {
        lines.push(format!("Day:        {day_id}"));
    }
    let activity = snapshot
        .activity
        .map_or("Not tracking".to_string(), |activity| activity.to_string());
    lines.push(format!("Activity:   {activity}"));

    if let Some(state) = snapshot.worktime_state {
        let text = WorktimeStateFormatter.display_text(&state);
        let text = if state.is_over_limit() {
            Colour::Red.paint(text).to_string()
        } else {
            text
        };
        lines.push(format!("Worktime:   {text}"));
    }
    lines.push(format!(
        "Worked:     {}h",
        DurationFormatter.hours_one_decimal(snapshot.elapsed_seconds)
    ));
    lines.push(format!(
        "Inactive:   {}",
        DurationFormatter.detailed_duration(snapshot.inactivity_seconds)
    ));

    if snapshot.paused {
        lines.push("Session is paused".into());
    }
    if snapshot.break_active {
        lines.push("Break in progress".into());
    }
    lines
}
