//! Integration tests for the provider lifecycle: lazy activation,
//! validation parking, quarantine and recovery, reload and unload.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use semver::Version;
use strato_contract::{
    Capability, CostEstimate, CostEstimator, CostQuery, CredentialPayload, Provider,
    ProviderConfig, ProviderError, ProviderMetadata,
};
use strato_core::{CapabilitySet, ProviderKey};
use strato_registry::{
    HealthConfig, HealthMonitor, InProcessFactory, ProviderRegistry, ProviderSpec, ProviderStatus,
    RegistryConfig, RegistryError,
};

/// Shared knobs for a stub backend, flipped by tests mid-run.
#[derive(Default)]
struct StubState {
    build_calls: AtomicU32,
    init_calls: AtomicU32,
    fail_init: AtomicBool,
    probe_ok: AtomicBool,
}

struct StubEstimator;

#[async_trait]
impl CostEstimator for StubEstimator {
    async fn estimate(
        &self,
        _credential: &CredentialPayload,
        _query: &CostQuery,
    ) -> Result<CostEstimate, ProviderError> {
        Ok(CostEstimate {
            hourly: 0.25,
            monthly: 182.5,
            currency: "USD".into(),
            notes: Vec::new(),
        })
    }
}

struct StubProvider {
    metadata: ProviderMetadata,
    state: Arc<StubState>,
    init_delay: Duration,
    estimator: StubEstimator,
}

#[async_trait]
impl Provider for StubProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn initialize(&self, _config: &ProviderConfig) -> Result<(), ProviderError> {
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_init.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("endpoint unreachable".into()));
        }
        Ok(())
    }

    async fn health_probe(&self) -> Result<(), ProviderError> {
        if self.state.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::Unavailable("still down".into()))
        }
    }

    fn cost_estimate(&self) -> Option<&dyn CostEstimator> {
        Some(&self.estimator)
    }
}

fn caps() -> CapabilitySet {
    CapabilitySet::from_iter([Capability::CostEstimate])
}

/// Registry serving one stub provider named `aws` at the given version.
fn registry_with(
    state: Arc<StubState>,
    version: Version,
    init_delay: Duration,
) -> Arc<ProviderRegistry> {
    let factory = InProcessFactory::new().with("aws", move |_spec| {
        state.build_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubProvider {
            metadata: ProviderMetadata::builder("aws", version.clone())
                .capability(Capability::CostEstimate)
                .build()
                .unwrap(),
            state: Arc::clone(&state),
            init_delay,
            estimator: StubEstimator,
        }) as Arc<dyn Provider>)
    });
    Arc::new(ProviderRegistry::new(Arc::new(factory)))
}

fn base_config() -> RegistryConfig {
    RegistryConfig {
        providers: vec![ProviderSpec::new("aws", caps())],
        health: HealthConfig {
            failure_threshold: 3,
            probe_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            max_concurrent_dispatches: 4,
        },
    }
}

fn aws() -> ProviderKey {
    "aws".parse().unwrap()
}

#[tokio::test]
async fn lazy_activation_on_first_ensure() {
    // GIVEN: a discovered provider that was never dispatched to
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 4, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Discovered
    );

    // WHEN: the first caller ensures it is loaded
    registry.ensure_loaded(&aws()).await.unwrap();

    // THEN: it was built and initialized exactly once and is serving
    let descriptor = registry.descriptor(&aws()).unwrap();
    assert_eq!(descriptor.status(), ProviderStatus::Healthy);
    assert_eq!(descriptor.resolved_version(), Some(&Version::new(1, 4, 0)));
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 1);

    let instance = registry.resolve(&aws()).unwrap();
    assert_eq!(instance.provider().key(), &aws());
    assert_eq!(instance.consecutive_failures(), 0);
}

#[tokio::test]
async fn concurrent_ensure_loaded_activates_once() {
    // GIVEN: a provider whose initialization takes a while
    let state = Arc::new(StubState::default());
    let registry = registry_with(
        Arc::clone(&state),
        Version::new(1, 0, 0),
        Duration::from_millis(20),
    );
    registry.apply(base_config()).await.unwrap();

    // WHEN: many tasks race to load the same name
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.ensure_loaded(&aws()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // THEN: exactly one instance was constructed and initialized
    assert_eq!(state.build_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn version_mismatch_parks_descriptor() {
    // GIVEN: a host constraint ^2.1 over an implementation reporting 1.4.0
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 4, 0), Duration::ZERO);
    let mut config = base_config();
    config.providers[0].version = "^2.1".parse().unwrap();
    registry.apply(config).await.unwrap();

    // WHEN: activation is attempted
    let err = registry.ensure_loaded(&aws()).await.unwrap_err();

    // THEN: the provider is parked, never activated, and initialize was
    // never called
    assert!(matches!(err, RegistryError::Incompatible { .. }), "got: {err}");
    let descriptor = registry.descriptor(&aws()).unwrap();
    assert_eq!(descriptor.status(), ProviderStatus::Discovered);
    assert!(descriptor.last_error().unwrap().contains("^2.1"));
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 0);

    // and a second attempt fails fast without rebuilding
    let err = registry.ensure_loaded(&aws()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Incompatible { .. }));
    assert_eq!(state.build_calls.load(Ordering::SeqCst), 1);

    let err = registry.resolve(&aws()).unwrap_err();
    assert!(matches!(err, RegistryError::Incompatible { .. }));
}

#[tokio::test]
async fn undeclared_capability_is_incompatible() {
    // GIVEN: a host declaring Compute for a CostEstimate-only backend
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    let mut config = base_config();
    config.providers[0].capabilities = CapabilitySet::from_iter([Capability::Compute]);
    registry.apply(config).await.unwrap();

    let err = registry.ensure_loaded(&aws()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Incompatible { .. }), "got: {err}");
}

#[tokio::test]
async fn failed_initialize_degrades_without_instance() {
    // GIVEN: a backend whose initialize fails
    let state = Arc::new(StubState::default());
    state.fail_init.store(true, Ordering::SeqCst);
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();

    // WHEN: activation runs
    let err = registry.ensure_loaded(&aws()).await.unwrap_err();

    // THEN: degraded, the failure is retained, and dispatch lookups report it
    assert!(matches!(err, RegistryError::InitFailed { .. }), "got: {err}");
    let descriptor = registry.descriptor(&aws()).unwrap();
    assert_eq!(descriptor.status(), ProviderStatus::Degraded);
    assert!(descriptor.last_error().unwrap().contains("unreachable"));

    let err = registry.resolve(&aws()).unwrap_err();
    assert!(matches!(err, RegistryError::InitFailed { .. }));

    // recovery path: fix the backend and reload
    state.fail_init.store(false, Ordering::SeqCst);
    registry.reload(&aws()).await.unwrap();
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    registry.resolve(&aws()).unwrap();
}

#[tokio::test]
async fn quarantine_after_threshold_and_probe_recovery() {
    // GIVEN: a healthy provider and a failure threshold of 3
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();

    // WHEN: failures accumulate below the threshold
    registry.record_failure(&aws());
    registry.record_failure(&aws());
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );

    // a success resets the streak
    registry.record_success(&aws());
    registry.record_failure(&aws());
    registry.record_failure(&aws());
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );

    // THEN: the third consecutive failure quarantines
    registry.record_failure(&aws());
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Degraded
    );
    let err = registry.resolve(&aws()).unwrap_err();
    assert!(matches!(err, RegistryError::Unhealthy { .. }), "got: {err}");
    // loaded, so ensure_loaded is a no-op rather than a rebuild
    registry.ensure_loaded(&aws()).await.unwrap();

    // a failing probe keeps it quarantined
    registry.probe_degraded().await;
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Degraded
    );

    // a succeeding probe puts it back in service with a clean slate
    state.probe_ok.store(true, Ordering::SeqCst);
    registry.probe_degraded().await;
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    let instance = registry.resolve(&aws()).unwrap();
    assert_eq!(instance.consecutive_failures(), 0);
    assert!(instance.last_health_check_at().is_some());
}

#[tokio::test(start_paused = true)]
async fn health_monitor_drives_recovery() {
    // GIVEN: a quarantined provider and a running monitor
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();
    for _ in 0..3 {
        registry.record_failure(&aws());
    }
    state.probe_ok.store(true, Ordering::SeqCst);

    let monitor = HealthMonitor::spawn(Arc::clone(&registry));

    // WHEN: one probe interval elapses
    tokio::time::sleep(Duration::from_secs(61)).await;

    // THEN: the monitor flipped the provider back on its own
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn health_monitor_picks_up_interval_changes() {
    // GIVEN: a quarantined provider and a monitor started under a 30s
    // interval
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();
    for _ in 0..3 {
        registry.record_failure(&aws());
    }
    state.probe_ok.store(true, Ordering::SeqCst);
    let monitor = HealthMonitor::spawn(Arc::clone(&registry));

    // WHEN: the host applies a much shorter probe interval without
    // restarting the monitor
    let mut config = base_config();
    config.health.probe_interval = Duration::from_secs(5);
    registry.apply(config).await.unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );

    // THEN: a fresh quarantine recovers on the new, shorter interval
    for _ in 0..3 {
        registry.record_failure(&aws());
    }
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Degraded
    );
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    monitor.shutdown().await;
}

#[tokio::test]
async fn reload_swaps_atomically_and_keeps_old_on_failure() {
    // GIVEN: a healthy provider with an in-flight borrower
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();
    let borrowed = registry.resolve(&aws()).unwrap();

    // WHEN: the provider is reloaded
    registry.reload(&aws()).await.unwrap();

    // THEN: new lookups see a fresh instance, the borrower keeps its old one
    let fresh = registry.resolve(&aws()).unwrap();
    assert!(!Arc::ptr_eq(&borrowed, &fresh));
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 2);

    // WHEN: a later reload fails to initialize
    state.fail_init.store(true, Ordering::SeqCst);
    let err = registry.reload(&aws()).await.unwrap_err();
    assert!(matches!(err, RegistryError::InitFailed { .. }), "got: {err}");

    // THEN: the previous instance keeps serving
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    let still = registry.resolve(&aws()).unwrap();
    assert!(Arc::ptr_eq(&fresh, &still));
}

#[tokio::test]
async fn apply_unloads_removed_names() {
    // GIVEN: a serving provider
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();

    // WHEN: a new config without it is applied
    let mut config = base_config();
    config.providers.clear();
    registry.apply(config).await.unwrap();

    // THEN: it is gone
    let err = registry.resolve(&aws()).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }), "got: {err}");
    assert!(registry.descriptor(&aws()).is_none());
}

#[tokio::test]
async fn apply_rediscovers_changed_spec_and_preloads() {
    // GIVEN: a serving provider
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 1);

    // WHEN: the same config is re-applied
    registry.apply(base_config()).await.unwrap();

    // THEN: the running instance is untouched
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 1);

    // WHEN: the spec changes and asks for eager activation
    let mut config = base_config();
    config.providers[0].config = ProviderConfig::new().with("region", "eu-central-1");
    config.providers[0].preload = true;
    registry.apply(config).await.unwrap();

    // THEN: the provider was re-activated with the new settings
    assert_eq!(
        registry.descriptor(&aws()).unwrap().status(),
        ProviderStatus::Healthy
    );
    assert_eq!(state.init_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unload_and_shutdown_remove_providers() {
    let state = Arc::new(StubState::default());
    let registry = registry_with(Arc::clone(&state), Version::new(1, 0, 0), Duration::ZERO);
    registry.apply(base_config()).await.unwrap();
    registry.ensure_loaded(&aws()).await.unwrap();

    registry.unload(&aws()).await.unwrap();
    assert!(matches!(
        registry.resolve(&aws()).unwrap_err(),
        RegistryError::NotFound { .. }
    ));

    // unknown names everywhere
    let ghost: ProviderKey = "ghost".parse().unwrap();
    assert!(matches!(
        registry.ensure_loaded(&ghost).await.unwrap_err(),
        RegistryError::NotFound { .. }
    ));

    registry.shutdown().await;
}
