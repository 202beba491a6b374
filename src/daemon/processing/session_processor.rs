use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, error, info};

use crate::{
    daemon::{sample::ActivitySample, session::SessionTracker},
    notification::NotificationService,
    settings::{PersistedSettings, SettingsStore},
    storage::{
        control::{ControlStore, SessionControl},
        day_record_store::DayRecordStore,
        status::StatusStore,
    },
};

use super::module::EventProcessor;

/// Bridges [ProcessingModule](super::ProcessingModule) and the session. Every sample re-reads
/// settings and control requests, advances the [SessionTracker] and persists what changed.
pub struct SessionProcessor<S: SettingsStore, R: DayRecordStore, Tz: TimeZone> {
    settings: S,
    records: R,
    control: ControlStore,
    status: StatusStore,
    tracker: SessionTracker<Tz>,
    notifier: Box<dyn NotificationService + Send>,
    reset_generation: Option<u64>,
    notifications_enabled: Option<bool>,
}

impl<S: SettingsStore, R: DayRecordStore, Tz: TimeZone> SessionProcessor<S, R, Tz> {
    pub fn new(
        settings: S,
        records: R,
        control: ControlStore,
        status: StatusStore,
        tracker: SessionTracker<Tz>,
        notifier: Box<dyn NotificationService + Send>,
    ) -> Self {
        Self {
            settings,
            records,
            control,
            status,
            tracker,
            notifier,
            reset_generation: None,
            notifications_enabled: None,
        }
    }

    /// The first generation seen only becomes the baseline, so requests made before the daemon
    /// started aren't replayed.
    fn apply_control(
        &mut self,
        now: DateTime<Utc>,
        control: &SessionControl,
        settings: &PersistedSettings,
    ) {
        match self.reset_generation {
            Some(generation) if generation != control.reset_generation => {
                let day_id = self
                    .tracker
                    .engine()
                    .gate_state(settings)
                    .is_allowed()
                    .then(|| self.tracker.engine().day_id(now, settings))
                    .flatten();
                self.tracker.reset(now, day_id, settings);
            }
            _ => {}
        }
        self.reset_generation = Some(control.reset_generation);

        self.tracker.set_paused(control.paused, now);
        self.tracker.set_break_active(control.break_active);
    }

    async fn resolve_day(&mut self, now: DateTime<Utc>, settings: &PersistedSettings) -> Result<()> {
        if !self.tracker.engine().gate_state(settings).is_allowed() {
            return Ok(());
        }
        let Some(day_id) = self.tracker.engine().day_id(now, settings) else {
            return Ok(());
        };
        if self.tracker.day_id() == Some(day_id.as_str()) {
            return Ok(());
        }

        let stored = self.records.load(&day_id).await?;
        if let Some(previous) = self.tracker.begin_day(day_id, stored, settings) {
            info!("Closing day {}", previous.day_id());
            self.records.save(&previous).await?;
        }
        Ok(())
    }

    fn update_authorization(&mut self, settings: &PersistedSettings) {
        let enabled = settings.notifications_enabled;
        if enabled == Some(true) && self.notifications_enabled != Some(true) {
            self.notifier.request_authorization_if_needed();
        }
        self.notifications_enabled = enabled;
    }

    fn deliver(&mut self, now: DateTime<Utc>, message: &str) {
        match self.notifier.send_over_limit_notification(message) {
            Ok(_) => {
                info!("Sent reminder: {message}");
                self.tracker.mark_notified(now);
            }
            Err(e) => error!("Failed to send reminder {e:?}"),
        }
    }
}

impl<S: SettingsStore, R: DayRecordStore, Tz: TimeZone> EventProcessor
    for SessionProcessor<S, R, Tz>
{
    async fn process_next(&mut self, sample: ActivitySample) -> Result<()> {
        let now = sample.timestamp;
        let settings = self.settings.load().await?;
        let control = self.control.load().await?;

        self.apply_control(now, &control, &settings);
        self.update_authorization(&settings);
        self.resolve_day(now, &settings).await?;

        let outcome = self.tracker.tick(now, sample.idle, &settings);
        debug!("Tick outcome {outcome:?}");

        if let Some(record) = self.tracker.take_changed_record() {
            self.records.save(&record).await?;
        }

        if let Some(message) = outcome.notification.as_deref() {
            self.deliver(now, message);
        }

        self.status.save(&self.tracker.snapshot(now, &outcome)).await
    }

    async fn finalize(&mut self) -> Result<()> {
        if let Some(record) = self.tracker.flush_record() {
            info!("Saving {} before shutdown", record.day_id());
            self.records.save(&record).await?;
        }
        Ok(())
    }
}
