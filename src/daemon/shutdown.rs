use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Detects signals sent to the process. This works with limited success.
///
/// On Windows detached processes can't detect signals sent to them, so `sundown stop` kills the
/// process instead.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(_) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal {e:?}"),
            }
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}
