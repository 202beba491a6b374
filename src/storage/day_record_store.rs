use std::{collections::BTreeMap, future::Future, path::PathBuf};

use anyhow::Result;
use tracing::debug;

use super::{
    day_record::DayRecord,
    json_file::{read_json, update_json},
};

pub const DAY_RECORDS_FILE: &str = "day_records.json";

/// Interface for abstracting storage of day records. One record exists per day id.
pub trait DayRecordStore {
    fn load(&self, day_id: &str) -> impl Future<Output = Result<Option<DayRecord>>> + Send;

    /// Returns every record ordered by day id ascending.
    fn load_all(&self) -> impl Future<Output = Result<Vec<DayRecord>>> + Send;

    /// Inserts or replaces the record with the same day id.
    fn save(&self, record: &DayRecord) -> impl Future<Output = Result<()>> + Send;
}

/// The main realization of [DayRecordStore]. All records live in a single JSON object keyed by
/// day id, which keeps `load_all` ordered for free.
#[derive(Debug, Clone)]
pub struct JsonDayRecordStore {
    path: PathBuf,
}

type RecordMap = BTreeMap<String, DayRecord>;

impl JsonDayRecordStore {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: app_dir.into().join(DAY_RECORDS_FILE),
        }
    }
}

impl DayRecordStore for JsonDayRecordStore {
    async fn load(&self, day_id: &str) -> Result<Option<DayRecord>> {
        let mut map: RecordMap = read_json(&self.path).await?;
        Ok(map.remove(day_id))
    }

    async fn load_all(&self) -> Result<Vec<DayRecord>> {
        let map: RecordMap = read_json(&self.path).await?;
        Ok(map.into_values().collect())
    }

    async fn save(&self, record: &DayRecord) -> Result<()> {
        debug!("Saving day record {record:?}");
        let record = record.clone();
        update_json(&self.path, move |map: &mut RecordMap| {
            map.insert(record.day_id().to_string(), record);
        })
        .await?;
        Ok(())
    }
}
