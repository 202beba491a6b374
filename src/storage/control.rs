//! Requests from the cli to the running daemon. The cli writes `control.json`, the daemon reads
//! it on every tick.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::json_file::{read_json, update_json};

pub const CONTROL_FILE: &str = "control.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionControl {
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub break_active: bool,
    /// Incremented for every requested reset. The daemon resets once per new value.
    #[serde(default)]
    pub reset_generation: u64,
}

#[derive(Debug, Clone)]
pub struct ControlStore {
    path: PathBuf,
}

impl ControlStore {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: app_dir.into().join(CONTROL_FILE),
        }
    }

    pub async fn load(&self) -> Result<SessionControl> {
        read_json(&self.path).await
    }

    pub async fn update(&self, update: impl FnOnce(&mut SessionControl) + Send) -> Result<SessionControl> {
        update_json(&self.path, update).await
    }

    pub async fn set_paused(&self, paused: bool) -> Result<SessionControl> {
        self.update(|control| control.paused = paused).await
    }

    pub async fn set_break_active(&self, break_active: bool) -> Result<SessionControl> {
        self.update(|control| control.break_active = break_active).await
    }

    pub async fn request_reset(&self) -> Result<SessionControl> {
        self.update(|control| {
            control.reset_generation = control.reset_generation.wrapping_add(1);
            control.paused = false;
            control.break_active = false;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{ControlStore, SessionControl};

    #[tokio::test]
    async fn test_defaults_when_missing() -> Result<()> {
        let dir = tempdir()?;
        let store = ControlStore::new(dir.path());
        assert_eq!(store.load().await?, SessionControl::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_requests_accumulate() -> Result<()> {
        let dir = tempdir()?;
        let store = ControlStore::new(dir.path());
        store.set_paused(true).await?;
        store.set_break_active(true).await?;
        assert_eq!(
            store.load().await?,
            SessionControl {
                paused: true,
                break_active: true,
                reset_generation: 0
            }
        );

        store.request_reset().await?;
        let control = store.request_reset().await?;
        assert_eq!(
            control,
            SessionControl {
                paused: false,
                break_active: false,
                reset_generation: 2
            }
        );
        Ok(())
    }
}
