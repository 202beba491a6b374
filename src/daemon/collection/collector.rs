use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, Instrument};

use crate::{daemon::sample::ActivitySample, idle_api::IdleSource, utils::clock::Clock};

/// Samples user inactivity at a fixed frequency and hands it over to the processing module.
pub struct ActivityCollector {
    next: mpsc::Sender<ActivitySample>,
    producer: Box<dyn IdleSource + Send>,
    shutdown: CancellationToken,
    collection_frequency: Duration,
    time_provider: Box<dyn Clock>,
}

impl ActivityCollector {
    pub fn new(
        next: mpsc::Sender<ActivitySample>,
        producer: Box<dyn IdleSource + Send>,
        shutdown: CancellationToken,
        collection_frequency: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            producer,
            shutdown,
            collection_frequency,
            time_provider,
        }
    }

    fn collect_sample(&mut self) -> Result<ActivitySample> {
        let idle_ms = self.producer.get_idle_time()?;
        Ok(ActivitySample {
            timestamp: self.time_provider.time(),
            idle: chrono::Duration::milliseconds(idle_ms.into()),
        })
    }

    /// Executes the collector event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut collection_point = self.time_provider.instant();
        loop {
            collection_point += self.collection_frequency;

            match self.collect_sample() {
                Ok(sample) => {
                    let span = info_span!("Sending activity sample");
                    debug!("Sending sample {:?}", sample);
                    self.next
                        .send(sample)
                        .instrument(span)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
                Err(e) => {
                    error!("Encountered an error during collection {:?}", e)
                }
            }

            tokio::select! {
                // Cancellation drops the sender, which in turn stops the processing module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(collection_point) => ()
            }
        }
    }
}
