use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::{
    engine::{
        activity::ActivityKind,
        notification_policy::OverLimitNotificationPolicy,
        onboarding::OnboardingGateState,
        worktime::{WorktimeState, WorktimeStateFormatter},
        TimeEngine,
    },
    settings::PersistedSettings,
    storage::{
        day_record::{DayRecord, PendingSeconds},
        status::StatusSnapshot,
    },
};

/// Gaps between ticks above this are treated as sleep/suspend and never credited.
pub const MAX_TICK_GAP: Duration = Duration::seconds(300);

/// Result of a single [SessionTracker::tick].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub gate: OnboardingGateState,
    /// `None` while nothing is being tracked (blocked gate or paused session).
    pub activity: Option<ActivityKind>,
    pub worktime_state: Option<WorktimeState>,
    pub inactivity_seconds: i64,
    /// Reminder text when an over-limit notification is due.
    pub notification: Option<String>,
}

/// Time that hasn't yet added up to a whole minute of a [DayRecord] bucket.
#[derive(Debug, Clone, Copy, Default)]
struct ActivityCarry {
    work: Duration,
    break_time: Duration,
    idle: Duration,
}

impl ActivityCarry {
    fn from_pending(pending: PendingSeconds) -> Self {
        Self {
            work: Duration::seconds(pending.work),
            break_time: Duration::seconds(pending.break_time),
            idle: Duration::seconds(pending.idle),
        }
    }

    fn to_pending(self) -> PendingSeconds {
        PendingSeconds {
            work: self.work.num_seconds(),
            break_time: self.break_time.num_seconds(),
            idle: self.idle.num_seconds(),
        }
    }

    fn bucket(&mut self, activity: ActivityKind) -> &mut Duration {
        match activity {
            ActivityKind::Work => &mut self.work,
            ActivityKind::BreakTime => &mut self.break_time,
            ActivityKind::Idle => &mut self.idle,
        }
    }
}

/// Holds the mutable state of a work session. All mutation goes through the methods below and
/// every decision is delegated to [TimeEngine] and [OverLimitNotificationPolicy].
pub struct SessionTracker<Tz: TimeZone = Local> {
    engine: TimeEngine<Tz>,
    policy: OverLimitNotificationPolicy,
    formatter: WorktimeStateFormatter,
    elapsed: Duration,
    last_tick_at: Option<DateTime<Utc>>,
    last_interaction_at: Option<DateTime<Utc>>,
    paused: bool,
    break_active: bool,
    was_over_limit: bool,
    last_notification_at: Option<DateTime<Utc>>,
    record: Option<DayRecord>,
    record_changed: bool,
    carry: ActivityCarry,
}

impl Default for SessionTracker<Local> {
    fn default() -> Self {
        Self::new(TimeEngine::new())
    }
}

impl<Tz: TimeZone> SessionTracker<Tz> {
    pub fn new(engine: TimeEngine<Tz>) -> Self {
        Self {
            engine,
            policy: OverLimitNotificationPolicy,
            formatter: WorktimeStateFormatter,
            elapsed: Duration::zero(),
            last_tick_at: None,
            last_interaction_at: None,
            paused: false,
            break_active: false,
            was_over_limit: false,
            last_notification_at: None,
            record: None,
            record_changed: false,
            carry: ActivityCarry::default(),
        }
    }

    pub fn engine(&self) -> &TimeEngine<Tz> {
        &self.engine
    }

    pub fn day_id(&self) -> Option<&str> {
        self.record.as_ref().map(|record| record.day_id())
    }

    pub fn record(&self) -> Option<&DayRecord> {
        self.record.as_ref()
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed.num_seconds()
    }

    pub fn last_notification_at(&self) -> Option<DateTime<Utc>> {
        self.last_notification_at
    }

    /// Switches to another sundown day and returns the record of the previous one. A stored
    /// record for the new day (after a restart) is continued, elapsed work time included.
    pub fn begin_day(
        &mut self,
        day_id: String,
        stored: Option<DayRecord>,
        settings: &PersistedSettings,
    ) -> Option<DayRecord> {
        self.store_pending();
        let previous = self.record.take();

        let record = match stored.filter(|record| record.day_id() == day_id) {
            Some(record) => {
                info!("Continuing day {day_id} from stored record");
                self.record_changed = false;
                record
            }
            None => {
                info!("Starting day {day_id}");
                self.record_changed = true;
                DayRecord::new(day_id, settings.daily_limit_minutes.unwrap_or(0))
            }
        };

        self.carry = ActivityCarry::from_pending(record.pending_seconds());
        self.elapsed = Duration::try_minutes(record.work_minutes())
            .and_then(|work| work.checked_add(&self.carry.work))
            .unwrap_or(Duration::MAX);
        self.last_notification_at = None;
        self.was_over_limit = self
            .engine
            .worktime_state(self.elapsed_seconds(), settings)
            .is_some_and(|state| state.is_over_limit());
        self.record = Some(record);
        previous
    }

    /// Starts the session over: nothing tracked, no reminder history, fresh record for `day_id`.
    pub fn reset(&mut self, now: DateTime<Utc>, day_id: Option<String>, settings: &PersistedSettings) {
        info!("Resetting session");
        self.elapsed = Duration::zero();
        self.carry = ActivityCarry::default();
        self.last_notification_at = None;
        self.was_over_limit = false;
        self.last_tick_at = Some(now);
        self.last_interaction_at = Some(now);
        self.record = day_id.map(|day_id| {
            DayRecord::new(day_id, settings.daily_limit_minutes.unwrap_or(0))
        });
        self.record_changed = self.record.is_some();
    }

    pub fn set_paused(&mut self, paused: bool, now: DateTime<Utc>) {
        if self.paused && !paused {
            // Paused time must never be credited.
            self.last_tick_at = Some(now);
        }
        if self.paused != paused {
            info!("Session paused: {paused}");
        }
        self.paused = paused;
    }

    pub fn set_break_active(&mut self, break_active: bool) {
        if self.break_active != break_active {
            info!("Break active: {break_active}");
        }
        self.break_active = break_active;
    }

    /// Records that a reminder was delivered.
    pub fn mark_notified(&mut self, now: DateTime<Utc>) {
        self.last_notification_at = Some(now);
    }

    /// The single update path of the session. `idle` is how long the user hasn't interacted
    /// with the machine as of `now`.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        idle: Duration,
        settings: &PersistedSettings,
    ) -> TickOutcome {
        let last_interaction_at = now - idle.max(Duration::zero());
        self.last_interaction_at = Some(last_interaction_at);
        let inactivity_seconds = (now - last_interaction_at).num_seconds().max(0);

        let delta = self
            .last_tick_at
            .map(|last_tick_at| (now - last_tick_at).max(Duration::zero()));
        self.last_tick_at = Some(now);

        let gate = self.engine.gate_state(settings);
        let tracking = gate.is_allowed() && self.record.is_some() && !self.paused;
        let activity = tracking
            .then(|| self.engine.activity(self.break_active, inactivity_seconds, settings));

        match (activity, delta) {
            (Some(_), Some(delta)) if delta > MAX_TICK_GAP => {
                warn!("Dropping {}s since previous tick", delta.num_seconds());
            }
            (Some(activity), Some(delta)) => self.credit(activity, delta),
            _ => {}
        }

        let worktime_state = if gate.is_allowed() {
            self.engine.worktime_state(self.elapsed_seconds(), settings)
        } else {
            None
        };
        let is_over_limit = worktime_state.is_some_and(|state| state.is_over_limit());

        let due = self.policy.should_notify(
            settings.notifications_enabled,
            is_over_limit,
            self.was_over_limit,
            now,
            self.last_notification_at,
            self.engine.reminder_interval_minutes(settings),
        );
        self.was_over_limit = is_over_limit;

        let notification = match worktime_state {
            Some(state) if due => Some(format!(
                "Over limit: {}",
                self.formatter.display_text(&state)
            )),
            _ => None,
        };

        TickOutcome {
            gate,
            activity,
            worktime_state,
            inactivity_seconds,
            notification,
        }
    }

    /// Returns the current record if it changed since the last call.
    pub fn take_changed_record(&mut self) -> Option<DayRecord> {
        if !self.record_changed {
            return None;
        }
        self.record_changed = false;
        self.store_pending();
        self.record.clone()
    }

    /// Returns the current record including time that hasn't reached a whole minute yet.
    pub fn flush_record(&mut self) -> Option<DayRecord> {
        self.store_pending();
        self.record.clone()
    }

    fn store_pending(&mut self) {
        if let Some(record) = self.record.as_mut() {
            record.set_pending_seconds(self.carry.to_pending());
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>, outcome: &TickOutcome) -> StatusSnapshot {
        StatusSnapshot {
            updated_at: now,
            gate: outcome.gate,
            day_id: self.day_id().map(str::to_string),
            elapsed_seconds: self.elapsed_seconds(),
            worktime_state: outcome.worktime_state,
            activity: outcome.activity,
            inactivity_seconds: outcome.inactivity_seconds,
            paused: self.paused,
            break_active: self.break_active,
        }
    }

    fn credit(&mut self, activity: ActivityKind, delta: Duration) {
        if activity == ActivityKind::Work {
            self.elapsed = self.elapsed.checked_add(&delta).unwrap_or(Duration::MAX);
        }

        let carry = self.carry.bucket(activity);
        *carry += delta;
        let whole_minutes = carry.num_minutes();
        if whole_minutes <= 0 {
            return;
        }
        *carry -= Duration::minutes(whole_minutes);

        if let Some(record) = self.record.as_mut() {
            debug!("Adding {whole_minutes}m of {activity} to {}", record.day_id());
            record.add(activity, whole_minutes);
            self.record_changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{
        engine::{
            activity::ActivityKind, onboarding::OnboardingGateState, worktime::WorktimeState,
            TimeEngine,
        },
        settings::PersistedSettings,
        storage::day_record::{DayRecord, PendingSeconds},
    };

    use super::SessionTracker;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap()
    }

    fn settings() -> PersistedSettings {
        PersistedSettings {
            daily_limit_minutes: Some(480),
            day_reset_minutes_from_midnight: Some(240),
            notifications_enabled: Some(true),
            idle_threshold_minutes: Some(5),
            over_limit_reminder_minutes: Some(30),
        }
    }

    fn started(settings: &PersistedSettings) -> SessionTracker<Utc> {
        let mut tracker = SessionTracker::new(TimeEngine::with_timezone(Utc));
        let day_id = tracker.engine().day_id(start(), settings).unwrap();
        tracker.begin_day(day_id, None, settings);
        tracker.tick(start(), Duration::zero(), settings);
        tracker
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        start() + Duration::seconds(seconds)
    }

    #[test]
    fn test_work_is_credited() {
        let settings = settings();
        let mut tracker = started(&settings);

        let outcome = tracker.tick(at(30), Duration::zero(), &settings);
        assert_eq!(outcome.activity, Some(ActivityKind::Work));
        assert_eq!(tracker.elapsed_seconds(), 30);
        assert_eq!(tracker.record().unwrap().work_minutes(), 0);

        let outcome = tracker.tick(at(90), Duration::seconds(2), &settings);
        assert_eq!(tracker.elapsed_seconds(), 90);
        assert_eq!(tracker.record().unwrap().work_minutes(), 1);
        assert_eq!(outcome.inactivity_seconds, 2);
        assert_eq!(
            outcome.worktime_state,
            Some(WorktimeState::UnderLimit {
                remaining_seconds: 480 * 60 - 90
            })
        );
    }

    #[test]
    fn test_stale_gap_is_dropped() {
        let settings = settings();
        let mut tracker = started(&settings);

        tracker.tick(at(301), Duration::zero(), &settings);
        assert_eq!(tracker.elapsed_seconds(), 0);

        tracker.tick(at(311), Duration::zero(), &settings);
        assert_eq!(tracker.elapsed_seconds(), 10);

        tracker.tick(at(611), Duration::zero(), &settings);
        assert_eq!(tracker.elapsed_seconds(), 310);
    }

    #[test]
    fn test_idle_time_goes_to_idle_bucket() {
        let settings = settings();
        let mut tracker = started(&settings);

        let outcome = tracker.tick(at(60), Duration::minutes(5), &settings);
        assert_eq!(outcome.activity, Some(ActivityKind::Idle));
        assert_eq!(tracker.elapsed_seconds(), 0);
        assert_eq!(tracker.record().unwrap().idle_minutes(), 1);
        assert_eq!(tracker.record().unwrap().work_minutes(), 0);
    }

    #[test]
    fn test_break_wins_and_is_not_work() {
        let settings = settings();
        let mut tracker = started(&settings);
        tracker.set_break_active(true);

        let outcome = tracker.tick(at(120), Duration::minutes(30), &settings);
        assert_eq!(outcome.activity, Some(ActivityKind::BreakTime));
        assert_eq!(tracker.elapsed_seconds(), 0);
        assert_eq!(tracker.record().unwrap().break_minutes(), 2);
    }

    #[test]
    fn test_paused_time_is_not_credited() {
        let settings = settings();
        let mut tracker = started(&settings);
        tracker.set_paused(true, at(0));

        let outcome = tracker.tick(at(60), Duration::zero(), &settings);
        assert_eq!(outcome.activity, None);
        assert_eq!(tracker.elapsed_seconds(), 0);

        tracker.set_paused(false, at(200));
        tracker.tick(at(210), Duration::zero(), &settings);
        assert_eq!(tracker.elapsed_seconds(), 10);
    }

    #[test]
    fn test_blocked_gate_tracks_nothing() {
        let blocked = PersistedSettings {
            daily_limit_minutes: Some(0),
            ..settings()
        };
        let mut tracker = started(&settings());

        let outcome = tracker.tick(at(30), Duration::zero(), &blocked);
        assert_eq!(outcome.gate, OnboardingGateState::BlockedInvalidDailyLimit);
        assert_eq!(outcome.activity, None);
        assert_eq!(outcome.worktime_state, None);
        assert_eq!(tracker.elapsed_seconds(), 0);
    }

    #[test]
    fn test_crossing_the_limit_notifies_once_per_interval() {
        let settings = PersistedSettings {
            daily_limit_minutes: Some(1),
            ..settings()
        };
        let mut tracker = started(&settings);

        let outcome = tracker.tick(at(60), Duration::zero(), &settings);
        assert_eq!(
            outcome.worktime_state,
            Some(WorktimeState::UnderLimit {
                remaining_seconds: 0
            })
        );
        assert_eq!(outcome.notification, None);

        let outcome = tracker.tick(at(90), Duration::zero(), &settings);
        assert_eq!(
            outcome.notification.as_deref(),
            Some("Over limit: +0h 00m 30s")
        );
        tracker.mark_notified(at(90));

        let outcome = tracker.tick(at(120), Duration::zero(), &settings);
        assert_eq!(outcome.notification, None);

        let outcome = tracker.tick(at(89 + 30 * 60), Duration::zero(), &settings);
        assert_eq!(outcome.notification, None);
        let outcome = tracker.tick(at(90 + 30 * 60), Duration::zero(), &settings);
        assert_eq!(
            outcome.notification.as_deref(),
            Some("Over limit: +0h 01m 01s")
        );
    }

    #[test]
    fn test_undelivered_reminder_is_retried() {
        let settings = PersistedSettings {
            daily_limit_minutes: Some(1),
            ..settings()
        };
        let mut tracker = started(&settings);
        tracker.tick(at(61), Duration::zero(), &settings);

        let outcome = tracker.tick(at(62), Duration::zero(), &settings);
        assert!(outcome.notification.is_some());
    }

    #[test]
    fn test_disabled_notifications_stay_silent() {
        let settings = PersistedSettings {
            daily_limit_minutes: Some(1),
            notifications_enabled: None,
            ..settings()
        };
        let mut tracker = started(&settings);

        let outcome = tracker.tick(at(61), Duration::zero(), &settings);
        assert!(outcome.worktime_state.unwrap().is_over_limit());
        assert_eq!(outcome.notification, None);
    }

    #[test]
    fn test_begin_day_continues_stored_record() {
        let settings = settings();
        let mut tracker = started(&settings);
        tracker.tick(at(120), Duration::zero(), &settings);

        let stored = DayRecord::with_minutes("2024-02-01", 300, 90, 5, 0);
        let previous = tracker.begin_day("2024-02-01".into(), Some(stored.clone()), &settings);

        assert_eq!(previous.unwrap().work_minutes(), 2);
        assert_eq!(tracker.day_id(), Some("2024-02-01"));
        assert_eq!(tracker.elapsed_seconds(), 90 * 60);
        assert_eq!(tracker.record(), Some(&stored));
        assert_eq!(tracker.take_changed_record(), None);
    }

    #[test]
    fn test_huge_stored_work_saturates() {
        let settings = settings();
        let mut tracker = started(&settings);

        let stored = DayRecord::with_minutes("2024-02-01", 480, 9_223_372_036_854_775, 0, 0);
        tracker.begin_day("2024-02-01".into(), Some(stored), &settings);
        tracker.tick(at(0), Duration::zero(), &settings);
        let outcome = tracker.tick(at(30), Duration::zero(), &settings);

        assert!(outcome.worktime_state.unwrap().is_over_limit());
        assert_eq!(tracker.elapsed_seconds(), Duration::MAX.num_seconds());
    }

    #[test]
    fn test_partial_minutes_survive_a_new_tracker() {
        let settings = settings();
        let mut tracker = started(&settings);
        tracker.tick(at(90), Duration::zero(), &settings);
        tracker.set_break_active(true);
        tracker.tick(at(110), Duration::zero(), &settings);

        let record = tracker.flush_record().unwrap();
        assert_eq!(record.work_minutes(), 1);
        assert_eq!(
            record.pending_seconds(),
            PendingSeconds {
                work: 30,
                break_time: 20,
                idle: 0
            }
        );

        let mut restarted = SessionTracker::new(TimeEngine::with_timezone(Utc));
        restarted.begin_day(record.day_id().to_string(), Some(record), &settings);
        assert_eq!(restarted.elapsed_seconds(), 90);
        restarted.tick(at(200), Duration::zero(), &settings);
        restarted.tick(at(230), Duration::zero(), &settings);
        assert_eq!(restarted.record().unwrap().work_minutes(), 2);
    }

    #[test]
    fn test_new_day_starts_empty_with_current_limit() {
        let settings = settings();
        let mut tracker = started(&settings);
        tracker.tick(at(120), Duration::zero(), &settings);

        let shorter = PersistedSettings {
            daily_limit_minutes: Some(60),
            ..settings
        };
        tracker.begin_day("2024-02-01".into(), None, &shorter);

        assert_eq!(tracker.elapsed_seconds(), 0);
        let record = tracker.take_changed_record().unwrap();
        assert_eq!(record.limit_minutes(), 60);
        assert_eq!(record.work_minutes(), 0);
    }

    #[test]
    fn test_reset_clears_session() {
        let settings = PersistedSettings {
            daily_limit_minutes: Some(1),
            ..settings()
        };
        let mut tracker = started(&settings);
        tracker.tick(at(120), Duration::zero(), &settings);
        tracker.mark_notified(at(120));

        tracker.reset(at(130), Some("2024-01-31".into()), &settings);

        assert_eq!(tracker.elapsed_seconds(), 0);
        assert_eq!(tracker.last_notification_at(), None);
        let record = tracker.take_changed_record().unwrap();
        assert_eq!(record, DayRecord::new("2024-01-31", 1));

        tracker.tick(at(140), Duration::zero(), &settings);
        assert_eq!(tracker.elapsed_seconds(), 10);
    }
}
