//! Delivery of over-limit reminders. Whether a reminder is due is decided by
//! [crate::engine::notification_policy::OverLimitNotificationPolicy]; this module only sends it.

use std::{process::Stdio, sync::OnceLock};

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

pub const NOTIFICATION_TITLE: &str = "Sundown";

#[cfg_attr(test, mockall::automock)]
pub trait NotificationService {
    fn request_authorization_if_needed(&mut self);

    fn send_over_limit_notification(&mut self, message: &str) -> Result<()>;
}

/// Only writes reminders into the log.
#[derive(Debug, Default)]
pub struct LogNotificationService;

impl NotificationService for LogNotificationService {
    fn request_authorization_if_needed(&mut self) {
        debug!("Log notifications need no authorization");
    }

    fn send_over_limit_notification(&mut self, message: &str) -> Result<()> {
        warn!("{NOTIFICATION_TITLE}: {message}");
        Ok(())
    }
}

/// Sends reminders through `notify-send`. If the tool isn't available the reminder is logged
/// instead.
#[derive(Debug, Default)]
pub struct DesktopNotificationService {
    available: OnceLock<bool>,
    fallback: LogNotificationService,
}

impl DesktopNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let available = std::process::Command::new("notify-send")
                .arg("--version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);
            info!("Desktop notifications available: {available}");
            available
        })
    }
}

impl NotificationService for DesktopNotificationService {
    fn request_authorization_if_needed(&mut self) {
        self.is_available();
    }

    fn send_over_limit_notification(&mut self, message: &str) -> Result<()> {
        if !self.is_available() {
            return self.fallback.send_over_limit_notification(message);
        }

        let status = std::process::Command::new("notify-send")
            .args([NOTIFICATION_TITLE, message])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(anyhow!("notify-send exited with {status}"));
        }
        Ok(())
    }
}
