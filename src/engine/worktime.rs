use serde::{Deserialize, Serialize};

/// Position of tracked work time relative to the daily limit. Reaching the limit exactly is still
/// [WorktimeState::UnderLimit] with nothing remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorktimeState {
    UnderLimit { remaining_seconds: i64 },
    OverLimit { overtime_seconds: i64 },
}

impl WorktimeState {
    pub fn is_over_limit(&self) -> bool {
        matches!(self, WorktimeState::OverLimit { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorktimeStateEvaluator;

impl WorktimeStateEvaluator {
    pub fn evaluate(&self, elapsed_seconds: i64, daily_limit_minutes: i64) -> WorktimeState {
        let elapsed_seconds = elapsed_seconds.max(0);
        let limit_seconds = daily_limit_minutes.max(0).saturating_mul(60);

        if elapsed_seconds <= limit_seconds {
            WorktimeState::UnderLimit {
                remaining_seconds: limit_seconds - elapsed_seconds,
            }
        } else {
            WorktimeState::OverLimit {
                overtime_seconds: elapsed_seconds - limit_seconds,
            }
        }
    }
}

/// Renders [WorktimeState] the way it's shown to the user and embedded into reminders.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorktimeStateFormatter;

impl WorktimeStateFormatter {
    pub fn display_text(&self, state: &WorktimeState) -> String {
        match *state {
            WorktimeState::UnderLimit { remaining_seconds } => {
                format!("{} left", hms(remaining_seconds))
            }
            WorktimeState::OverLimit { overtime_seconds } => format!("+{}", hms(overtime_seconds)),
        }
    }

    pub fn is_over_limit(&self, state: &WorktimeState) -> bool {
        state.is_over_limit()
    }
}

fn hms(total_seconds: i64) -> String {
    format!(
        "{}h {:02}m {:02}s",
        total_seconds / 3_600,
        (total_seconds % 3_600) / 60,
        total_seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::{WorktimeState, WorktimeStateEvaluator, WorktimeStateFormatter};

    #[test]
    fn test_under_limit() {
        let state = WorktimeStateEvaluator.evaluate(9_420, 480);
        assert_eq!(
            state,
            WorktimeState::UnderLimit {
                remaining_seconds: 19_380
            }
        );
    }

    #[test]
    fn test_exact_limit_is_under_with_zero_remaining() {
        let state = WorktimeStateEvaluator.evaluate(28_800, 480);
        assert_eq!(
            state,
            WorktimeState::UnderLimit {
                remaining_seconds: 0
            }
        );
        assert!(!state.is_over_limit());
    }

    #[test]
    fn test_over_limit() {
        let state = WorktimeStateEvaluator.evaluate(31_020, 480);
        assert_eq!(
            state,
            WorktimeState::OverLimit {
                overtime_seconds: 2_220
            }
        );
        assert_eq!(WorktimeStateFormatter.display_text(&state), "+0h 37m 00s");
        assert!(WorktimeStateFormatter.is_over_limit(&state));
    }

    #[test]
    fn test_one_second_past_limit() {
        let state = WorktimeStateEvaluator.evaluate(28_801, 480);
        assert_eq!(
            state,
            WorktimeState::OverLimit {
                overtime_seconds: 1
            }
        );
    }

    #[test]
    fn test_negative_inputs_are_clamped() {
        assert_eq!(
            WorktimeStateEvaluator.evaluate(-100, 10),
            WorktimeState::UnderLimit {
                remaining_seconds: 600
            }
        );
        assert_eq!(
            WorktimeStateEvaluator.evaluate(0, -10),
            WorktimeState::UnderLimit {
                remaining_seconds: 0
            }
        );
        assert_eq!(
            WorktimeStateEvaluator.evaluate(30, -10),
            WorktimeState::OverLimit {
                overtime_seconds: 30
            }
        );
    }

    #[test]
    fn test_huge_limit_saturates() {
        assert_eq!(
            WorktimeStateEvaluator.evaluate(10, i64::MAX / 2),
            WorktimeState::UnderLimit {
                remaining_seconds: i64::MAX - 10
            }
        );
        assert_eq!(
            WorktimeStateEvaluator.evaluate(i64::MAX, i64::MAX),
            WorktimeState::UnderLimit {
                remaining_seconds: 0
            }
        );
    }

    #[test]
    fn test_under_limit_display() {
        let text = WorktimeStateFormatter.display_text(&WorktimeState::UnderLimit {
            remaining_seconds: 8_298,
        });
        assert_eq!(text, "2h 18m 18s left");
    }

    #[test]
    fn test_hours_are_not_padded() {
        let text = WorktimeStateFormatter.display_text(&WorktimeState::OverLimit {
            overtime_seconds: 12 * 3_600 + 5,
        });
        assert_eq!(text, "+12h 00m 05s");
    }
}
