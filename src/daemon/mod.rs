use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use collection::collector::ActivityCollector;
use processing::{session_processor::SessionProcessor, ProcessingModule};
use sample::ActivitySample;
use session::SessionTracker;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    idle_api::{GenericIdleSource, IdleSource},
    notification::{DesktopNotificationService, NotificationService},
    settings::{JsonSettingsStore, SettingsStore},
    storage::{control::ControlStore, day_record_store::JsonDayRecordStore, status::StatusStore},
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod collection;
pub mod processing;
pub mod sample;
pub mod session;
pub mod shutdown;

const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(1);

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    let dir = dir.canonicalize()?;
    std::env::set_current_dir("/")?;

    normalize_settings(&JsonSettingsStore::new(&dir)).await?;

    let (sender, receiver) = mpsc::channel::<ActivitySample>(10);
    let idle_source = GenericIdleSource::new()?;

    let shutdown_token = CancellationToken::new();

    let collector = create_collector(sender, idle_source, &shutdown_token, DefaultClock);

    let processor = create_processor(&dir, receiver, DesktopNotificationService::new());

    let (_, collection_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        collector.run(),
        processor.run(),
    );

    if let Err(collection_result) = collection_result {
        error!("Collection module got an error {:?}", collection_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    Ok(())
}

/// Fills in the default reset time for settings that only have a daily limit.
async fn normalize_settings(store: &impl SettingsStore) -> Result<()> {
    let mut settings = store.load().await?;
    if settings.normalize_onboarding_defaults() {
        info!("Reset time wasn't set, using the default");
        store.save(&settings).await?;
    }
    Ok(())
}

fn create_collector(
    sender: mpsc::Sender<ActivitySample>,
    idle_source: impl IdleSource + Send + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> ActivityCollector {
    ActivityCollector::new(
        sender,
        Box::new(idle_source),
        shutdown_token.clone(),
        DEFAULT_COLLECTION_INTERVAL,
        Box::new(clock),
    )
}

fn create_processor(
    dir: &Path,
    receiver: mpsc::Receiver<ActivitySample>,
    notifier: impl NotificationService + Send + 'static,
) -> ProcessingModule<SessionProcessor<JsonSettingsStore, JsonDayRecordStore, chrono::Local>> {
    let processor = SessionProcessor::new(
        JsonSettingsStore::new(dir),
        JsonDayRecordStore::new(dir),
        ControlStore::new(dir),
        StatusStore::new(dir),
        SessionTracker::default(),
        Box::new(notifier),
    );
    ProcessingModule::new(receiver, processor)
}
