use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::activity::ActivityKind;

/// Read-only projection of a [DayRecord].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RitualTotals {
    pub work_minutes: i64,
    pub break_minutes: i64,
    pub idle_minutes: i64,
    pub total_minutes: i64,
}

impl RitualTotals {
    pub fn new(work_minutes: i64, break_minutes: i64, idle_minutes: i64) -> Self {
        let work_minutes = work_minutes.max(0);
        let break_minutes = break_minutes.max(0);
        let idle_minutes = idle_minutes.max(0);
        Self {
            work_minutes,
            break_minutes,
            idle_minutes,
            total_minutes: work_minutes
                .saturating_add(break_minutes)
                .saturating_add(idle_minutes),
        }
    }
}

/// Seconds of each activity that haven't added up to a whole minute yet. Stored with the record
/// so a daemon restart continues from them. Every value is within `[0, 59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingSeconds {
    #[serde(default)]
    pub work: i64,
    #[serde(default)]
    pub break_time: i64,
    #[serde(default)]
    pub idle: i64,
}

impl PendingSeconds {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn clamped(self) -> Self {
        Self {
            work: self.work.clamp(0, 59),
            break_time: self.break_time.clamp(0, 59),
            idle: self.idle.clamp(0, 59),
        }
    }
}

/// Per sundown day aggregate of minutes by activity.
///
/// `limit_minutes` is a snapshot taken when the record is created, so changing the daily limit
/// later never rewrites history. `over_minutes` is always `max(0, work - limit)`; deserialization
/// goes through the same constructor, so a hand-edited file can't break that either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRecord {
    day_id: String,
    work_minutes: i64,
    break_minutes: i64,
    idle_minutes: i64,
    limit_minutes: i64,
    over_minutes: i64,
    #[serde(default, skip_serializing_if = "PendingSeconds::is_empty")]
    pending_seconds: PendingSeconds,
}

impl DayRecord {
    pub fn new(day_id: impl Into<String>, limit_minutes: i64) -> Self {
        Self::with_minutes(day_id, limit_minutes, 0, 0, 0)
    }

    pub fn with_minutes(
        day_id: impl Into<String>,
        limit_minutes: i64,
        work_minutes: i64,
        break_minutes: i64,
        idle_minutes: i64,
    ) -> Self {
        let mut record = Self {
            day_id: day_id.into(),
            work_minutes: work_minutes.max(0),
            break_minutes: break_minutes.max(0),
            idle_minutes: idle_minutes.max(0),
            limit_minutes: limit_minutes.max(0),
            over_minutes: 0,
            pending_seconds: PendingSeconds::default(),
        };
        record.recalculate_over_minutes();
        record
    }

    pub fn add(&mut self, activity: ActivityKind, minutes: i64) {
        let minutes = minutes.max(0);
        match activity {
            ActivityKind::Work => self.work_minutes = self.work_minutes.saturating_add(minutes),
            ActivityKind::BreakTime => {
                self.break_minutes = self.break_minutes.saturating_add(minutes)
            }
            ActivityKind::Idle => self.idle_minutes = self.idle_minutes.saturating_add(minutes),
        }
        self.recalculate_over_minutes();
    }

    pub fn ritual_totals(&self) -> RitualTotals {
        RitualTotals::new(self.work_minutes, self.break_minutes, self.idle_minutes)
    }

    pub fn day_id(&self) -> &str {
        &self.day_id
    }

    pub fn work_minutes(&self) -> i64 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> i64 {
        self.break_minutes
    }

    pub fn idle_minutes(&self) -> i64 {
        self.idle_minutes
    }

    pub fn limit_minutes(&self) -> i64 {
        self.limit_minutes
    }

    pub fn over_minutes(&self) -> i64 {
        self.over_minutes
    }

    pub fn pending_seconds(&self) -> PendingSeconds {
        self.pending_seconds
    }

    pub fn set_pending_seconds(&mut self, pending: PendingSeconds) {
        self.pending_seconds = pending.clamped();
    }

    fn recalculate_over_minutes(&mut self) {
        self.over_minutes = (self.work_minutes - self.limit_minutes).max(0);
    }
}

#[derive(Deserialize)]
struct DayRecordEntity {
    day_id: String,
    #[serde(default)]
    work_minutes: i64,
    #[serde(default)]
    break_minutes: i64,
    #[serde(default)]
    idle_minutes: i64,
    #[serde(default)]
    limit_minutes: i64,
    #[serde(default)]
    pending_seconds: PendingSeconds,
}

impl<'de> Deserialize<'de> for DayRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let DayRecordEntity {
            day_id,
            work_minutes,
            break_minutes,
            idle_minutes,
            limit_minutes,
            pending_seconds,
        } = DayRecordEntity::deserialize(deserializer)?;
        let mut record = DayRecord::with_minutes(
            day_id,
            limit_minutes,
            work_minutes,
            break_minutes,
            idle_minutes,
        );
        record.set_pending_seconds(pending_seconds);
        Ok(record)
    }
}
