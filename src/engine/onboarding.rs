use serde::{Deserialize, Serialize};

use super::day_boundary::MAX_RESET_MINUTES;

/// The part of the settings the gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OnboardingSettings {
    pub daily_limit_minutes: Option<i64>,
    pub day_reset_minutes_from_midnight: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingGateState {
    BlockedMissingDailyLimit,
    BlockedInvalidDailyLimit,
    BlockedMissingResetTime,
    BlockedInvalidResetTime,
    Allowed,
}

impl OnboardingGateState {
    pub fn is_allowed(&self) -> bool {
        matches!(self, OnboardingGateState::Allowed)
    }

    pub fn message(&self) -> &'static str {
        match self {
            OnboardingGateState::BlockedMissingDailyLimit => "Set daily limit to start",
            OnboardingGateState::BlockedInvalidDailyLimit => "Daily limit must be above 0",
            OnboardingGateState::BlockedMissingResetTime => "Set day reset time to start",
            OnboardingGateState::BlockedInvalidResetTime => "Reset time must be 00:00-23:59",
            OnboardingGateState::Allowed => "Sundown is ready",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingGateEvaluator;

impl OnboardingGateEvaluator {
    /// Checks run in a fixed order and the first failing one decides the state, so the user
    /// always sees the same message for the same settings.
    pub fn evaluate(&self, settings: OnboardingSettings) -> OnboardingGateState {
        let Some(daily_limit_minutes) = settings.daily_limit_minutes else {
            return OnboardingGateState::BlockedMissingDailyLimit;
        };
        if daily_limit_minutes <= 0 {
            return OnboardingGateState::BlockedInvalidDailyLimit;
        }

        let Some(reset_minutes) = settings.day_reset_minutes_from_midnight else {
            return OnboardingGateState::BlockedMissingResetTime;
        };
        if !(0..=MAX_RESET_MINUTES).contains(&reset_minutes) {
            return OnboardingGateState::BlockedInvalidResetTime;
        }

        OnboardingGateState::Allowed
    }
}
