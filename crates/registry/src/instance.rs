//! A live, activated provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use strato_contract::Provider;
use tokio::sync::Semaphore;

/// One activated provider instance.
///
/// Owned exclusively by the registry; the router borrows `Arc` clones for
/// the duration of a call, so a reload or unload never interrupts an
/// in-flight dispatch.
pub struct PluginInstance {
    provider: Arc<dyn Provider>,
    loaded_at: DateTime<Utc>,
    last_health_check_at: RwLock<Option<DateTime<Utc>>>,
    consecutive_failures: AtomicU32,
    limiter: Arc<Semaphore>,
}

impl PluginInstance {
    pub(crate) fn new(provider: Arc<dyn Provider>, max_concurrent_dispatches: usize) -> Self {
        Self {
            provider,
            loaded_at: Utc::now(),
            last_health_check_at: RwLock::new(None),
            consecutive_failures: AtomicU32::new(0),
            limiter: Arc::new(Semaphore::new(max_concurrent_dispatches)),
        }
    }

    /// The provider implementation.
    #[inline]
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// When this instance was activated.
    #[inline]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// When the health monitor last probed this instance.
    pub fn last_health_check_at(&self) -> Option<DateTime<Utc>> {
        *self.last_health_check_at.read()
    }

    /// Current consecutive-failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Per-provider bound on concurrently executing dispatches. The router
    /// holds a permit for the duration of each backend call.
    #[inline]
    pub fn limiter(&self) -> &Arc<Semaphore> {
        &self.limiter
    }

    pub(crate) fn record_probe(&self) {
        *self.last_health_check_at.write() = Some(Utc::now());
    }

    pub(crate) fn reset_failures(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    /// Increment the failure counter and return the new count.
    pub(crate) fn count_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("provider", &self.provider.key())
            .field("loaded_at", &self.loaded_at)
            .field("consecutive_failures", &self.consecutive_failures())
            .finish_non_exhaustive()
    }
}
