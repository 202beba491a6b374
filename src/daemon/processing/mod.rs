use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error};

use super::sample::ActivitySample;

pub mod module;
pub mod session_processor;

/// Receives samples from the collector and feeds them into an [EventProcessor] until the channel
/// is closed.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<ActivitySample>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<ActivitySample>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(sample) = self.receiver.recv().await {
            debug!("Processing sample {:?}", sample);
            if let Err(e) = self.processor.process_next(sample).await {
                error!("Error processing sample {:?}: {e:?}", sample)
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
