use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// What the user is doing during a tick. Break has priority over idle, idle over work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Work,
    BreakTime,
    Idle,
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityKind::Work => write!(f, "Work"),
            ActivityKind::BreakTime => write!(f, "Break"),
            ActivityKind::Idle => write!(f, "Idle"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityClassifier;

impl ActivityClassifier {
    pub fn classify(
        &self,
        is_break_active: bool,
        inactivity_seconds: i64,
        idle_threshold_minutes: i64,
    ) -> ActivityKind {
        if is_break_active {
            return ActivityKind::BreakTime;
        }

        let threshold_seconds = idle_threshold_minutes.max(1).saturating_mul(60);
        if inactivity_seconds.max(0) >= threshold_seconds {
            ActivityKind::Idle
        } else {
            ActivityKind::Work
        }
    }
}
