use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{
    activity::ActivityKind, onboarding::OnboardingGateState, worktime::WorktimeState,
};

use super::json_file::{read_json, write_json};

pub const STATUS_FILE: &str = "status.json";

/// A snapshot older than this means the daemon isn't ticking anymore.
pub const STATUS_STALE_AFTER: Duration = Duration::seconds(10);

/// Last state published by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub updated_at: DateTime<Utc>,
    pub gate: OnboardingGateState,
    pub day_id: Option<String>,
    pub elapsed_seconds: i64,
    pub worktime_state: Option<WorktimeState>,
    pub activity: Option<ActivityKind>,
    pub inactivity_seconds: i64,
    pub paused: bool,
    pub break_active: bool,
}

impl StatusSnapshot {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.updated_at > STATUS_STALE_AFTER
    }
}

#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: app_dir.into().join(STATUS_FILE),
        }
    }

    pub async fn load(&self) -> Result<Option<StatusSnapshot>> {
        read_json(&self.path).await
    }

    pub async fn save(&self, snapshot: &StatusSnapshot) -> Result<()> {
        write_json(&self.path, snapshot).await
    }
}
