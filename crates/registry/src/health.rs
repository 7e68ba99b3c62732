//! Background recovery probing for quarantined providers.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ProviderRegistry;

/// Drives periodic [`ProviderRegistry::probe_degraded`] rounds.
///
/// One monitor per registry. A quarantined provider stops receiving
/// dispatches immediately; this loop is the only path that puts it back in
/// service, by probing it on the configured interval until a probe succeeds.
/// The interval is re-read from the registry before each round, so a live
/// `apply` with a new `probe_interval` takes effect from the next round
/// without restarting the monitor.
#[derive(Debug)]
pub struct HealthMonitor {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawn the probe loop on the current tokio runtime. The first round
    /// runs a full interval after spawn.
    #[must_use]
    pub fn spawn(registry: Arc<ProviderRegistry>) -> Self {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let handle = tokio::spawn(async move {
            loop {
                let interval = registry.health_config().probe_interval;
                tokio::select! {
                    () = loop_token.cancelled() => break,
                    () = tokio::time::sleep(interval) => registry.probe_degraded().await,
                }
            }
            debug!("health monitor stopped");
        });
        Self { token, handle }
    }

    /// Stop the probe loop and wait for it to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}
