//! Background task keeping the uptime gauge current.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::recorder::BenchMetrics;

/// Handle to the periodic uptime updater.
///
/// The task runs independently of the publish loop and shares its metrics
/// instance. It keeps running until [`UptimeTask::stop`] is called.
pub struct UptimeTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl UptimeTask {
    /// Spawn the updater; the gauge is refreshed once per second.
    pub fn spawn(metrics: Arc<BenchMetrics>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => metrics.record_uptime(),
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the updater and wait for the task to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
