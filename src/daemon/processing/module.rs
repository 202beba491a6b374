use anyhow::Result;

use crate::daemon::sample::ActivitySample;

/// Represents a consumer of activity samples.
pub trait EventProcessor {
    fn process_next(
        &mut self,
        sample: ActivitySample,
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Called once after the last sample was received.
    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
