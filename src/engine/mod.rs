//! The time/state engine. Everything here is a pure function of its inputs: no clocks, no I/O,
//! no interior state. The daemon owns the mutable session and calls into [TimeEngine] on every
//! tick.

pub mod activity;
pub mod day_boundary;
pub mod duration;
pub mod notification_policy;
pub mod onboarding;
pub mod worktime;

use activity::{ActivityClassifier, ActivityKind};
use chrono::{DateTime, Local, TimeZone, Utc};
use day_boundary::DayBoundary;
use notification_policy::DEFAULT_REMINDER_INTERVAL_MINUTES;
use onboarding::{OnboardingGateEvaluator, OnboardingGateState};
use worktime::{WorktimeState, WorktimeStateEvaluator};

use crate::settings::PersistedSettings;

pub const DEFAULT_IDLE_THRESHOLD_MINUTES: i64 = 5;

/// Facade over the evaluators that resolves unset settings. Missing reset time or daily limit
/// means the feature isn't available yet and yields `None`. Idle threshold and reminder interval
/// fall back to their defaults.
#[derive(Debug, Clone)]
pub struct TimeEngine<Tz: TimeZone = Local> {
    day_boundary: DayBoundary<Tz>,
    worktime_evaluator: WorktimeStateEvaluator,
    activity_classifier: ActivityClassifier,
    gate_evaluator: OnboardingGateEvaluator,
}

impl TimeEngine<Local> {
    pub fn new() -> Self {
        Self::with_timezone(Local)
    }
}

impl Default for TimeEngine<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> TimeEngine<Tz> {
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            day_boundary: DayBoundary::with_timezone(timezone),
            worktime_evaluator: WorktimeStateEvaluator,
            activity_classifier: ActivityClassifier,
            gate_evaluator: OnboardingGateEvaluator,
        }
    }

    pub fn day_id(&self, now: DateTime<Utc>, settings: &PersistedSettings) -> Option<String> {
        let reset_minutes = settings.day_reset_minutes_from_midnight?;
        Some(self.day_boundary.day_id(now, reset_minutes))
    }

    pub fn worktime_state(
        &self,
        elapsed_seconds: i64,
        settings: &PersistedSettings,
    ) -> Option<WorktimeState> {
        let daily_limit_minutes = settings.daily_limit_minutes?;
        Some(
            self.worktime_evaluator
                .evaluate(elapsed_seconds, daily_limit_minutes),
        )
    }

    pub fn activity(
        &self,
        is_break_active: bool,
        inactivity_seconds: i64,
        settings: &PersistedSettings,
    ) -> ActivityKind {
        self.activity_classifier.classify(
            is_break_active,
            inactivity_seconds,
            self.idle_threshold_minutes(settings),
        )
    }

    pub fn idle_threshold_minutes(&self, settings: &PersistedSettings) -> i64 {
        settings
            .idle_threshold_minutes
            .unwrap_or(DEFAULT_IDLE_THRESHOLD_MINUTES)
            .max(1)
    }

    pub fn reminder_interval_minutes(&self, settings: &PersistedSettings) -> i64 {
        settings
            .over_limit_reminder_minutes
            .unwrap_or(DEFAULT_REMINDER_INTERVAL_MINUTES)
            .max(1)
    }

    pub fn gate_state(&self, settings: &PersistedSettings) -> OnboardingGateState {
        self.gate_evaluator.evaluate(settings.onboarding())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::{
        engine::{activity::ActivityKind, onboarding::OnboardingGateState, worktime::WorktimeState},
        settings::PersistedSettings,
    };

    use super::TimeEngine;

    fn settings() -> PersistedSettings {
        PersistedSettings {
            daily_limit_minutes: Some(480),
            day_reset_minutes_from_midnight: Some(240),
            notifications_enabled: Some(false),
            idle_threshold_minutes: Some(5),
            over_limit_reminder_minutes: Some(30),
        }
    }

    #[test]
    fn test_day_id_requires_reset_time() {
        let engine = TimeEngine::with_timezone(Utc);
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 2, 0, 0).unwrap();
        let missing = PersistedSettings {
            day_reset_minutes_from_midnight: None,
            ..settings()
        };

        assert_eq!(engine.day_id(now, &missing), None);
        assert_eq!(engine.day_id(now, &settings()).as_deref(), Some("2024-01-30"));
    }

    #[test]
    fn test_worktime_state_requires_limit() {
        let engine = TimeEngine::with_timezone(Utc);
        let missing = PersistedSettings {
            daily_limit_minutes: None,
            ..settings()
        };

        assert_eq!(engine.worktime_state(1_000, &missing), None);
        assert_eq!(
            engine.worktime_state(1_000, &settings()),
            Some(WorktimeState::UnderLimit {
                remaining_seconds: 27_800
            })
        );
    }

    #[test]
    fn test_idle_threshold_defaults_to_five_minutes() {
        let engine = TimeEngine::with_timezone(Utc);
        let unset = PersistedSettings {
            idle_threshold_minutes: None,
            over_limit_reminder_minutes: None,
            ..settings()
        };

        assert_eq!(engine.activity(false, 300, &unset), ActivityKind::Idle);
        assert_eq!(engine.activity(false, 299, &unset), ActivityKind::Work);
    }

    #[test]
    fn test_idle_threshold_is_clamped() {
        let engine = TimeEngine::with_timezone(Utc);
        let zero = PersistedSettings {
            idle_threshold_minutes: Some(0),
            ..settings()
        };

        assert_eq!(engine.idle_threshold_minutes(&zero), 1);
        assert_eq!(engine.activity(false, 60, &zero), ActivityKind::Idle);
    }

    #[test]
    fn test_reminder_interval_defaults() {
        let engine = TimeEngine::with_timezone(Utc);
        let unset = PersistedSettings {
            over_limit_reminder_minutes: None,
            ..settings()
        };
        let negative = PersistedSettings {
            over_limit_reminder_minutes: Some(-3),
            ..settings()
        };

        assert_eq!(engine.reminder_interval_minutes(&unset), 30);
        assert_eq!(engine.reminder_interval_minutes(&negative), 1);
        assert_eq!(engine.reminder_interval_minutes(&settings()), 30);
    }

    #[test]
    fn test_gate_state_follows_settings() {
        let engine = TimeEngine::with_timezone(Utc);
        assert_eq!(engine.gate_state(&settings()), OnboardingGateState::Allowed);
        assert_eq!(
            engine.gate_state(&PersistedSettings::default()),
            OnboardingGateState::BlockedMissingDailyLimit
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let engine = TimeEngine::with_timezone(Utc);
        let now = Utc.with_ymd_and_hms(2024, 5, 5, 23, 0, 0).unwrap();
        let settings = settings();

        assert_eq!(engine.day_id(now, &settings), engine.day_id(now, &settings));
        assert_eq!(
            engine.worktime_state(31_020, &settings),
            engine.worktime_state(31_020, &settings)
        );
        assert_eq!(
            engine.activity(false, 120, &settings),
            engine.activity(false, 120, &settings)
        );
    }
}
