//! User configuration. Every field is optional: absence means "not configured" and is resolved
//! per call by [crate::engine::TimeEngine], never by scattering defaults across call sites.

use std::{future::Future, path::PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    engine::onboarding::OnboardingSettings,
    storage::json_file::{read_json, write_json},
};

pub const SETTINGS_FILE: &str = "settings.json";

/// Reset time used when a daily limit is configured without one (04:00).
pub const DEFAULT_DAY_RESET_MINUTES: i64 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_limit_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_reset_minutes_from_midnight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_threshold_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_limit_reminder_minutes: Option<i64>,
}

impl PersistedSettings {
    pub fn onboarding(&self) -> OnboardingSettings {
        OnboardingSettings {
            daily_limit_minutes: self.daily_limit_minutes,
            day_reset_minutes_from_midnight: self.day_reset_minutes_from_midnight,
        }
    }

    /// Sets the daily limit. A limit without a reset time gets the default reset time so that a
    /// single setting is enough to pass onboarding.
    pub fn set_daily_limit(&mut self, minutes: i64) {
        self.daily_limit_minutes = Some(minutes);
        if self.day_reset_minutes_from_midnight.is_none() {
            self.day_reset_minutes_from_midnight = Some(DEFAULT_DAY_RESET_MINUTES);
        }
    }

    /// Wraps into a single day, so `-30` becomes `23:30`.
    pub fn set_reset_time(&mut self, minutes_from_midnight: i64) {
        self.day_reset_minutes_from_midnight = Some(minutes_from_midnight.rem_euclid(1_440));
    }

    /// Returns true if settings were changed.
    pub fn normalize_onboarding_defaults(&mut self) -> bool {
        if self.daily_limit_minutes.is_some() && self.day_reset_minutes_from_midnight.is_none() {
            self.day_reset_minutes_from_midnight = Some(DEFAULT_DAY_RESET_MINUTES);
            true
        } else {
            false
        }
    }
}

/// Interface for abstracting storage of settings.
pub trait SettingsStore {
    fn load(&self) -> impl Future<Output = Result<PersistedSettings>> + Send;

    fn save(&self, settings: &PersistedSettings) -> impl Future<Output = Result<()>> + Send;
}

/// Keeps settings in a single JSON file inside the application directory.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: app_dir.into().join(SETTINGS_FILE),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<PersistedSettings> {
        read_json(&self.path).await
    }

    async fn save(&self, settings: &PersistedSettings) -> Result<()> {
        write_json(&self.path, settings).await
    }
}
