//! The provider registry and loader.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use parking_lot::RwLock;
use semver::Version;
use strato_contract::Provider;
use strato_core::ProviderKey;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    HealthConfig, PluginInstance, ProviderDescriptor, ProviderFactory, ProviderSpec,
    ProviderStatus, RegistryConfig, RegistryError,
};

/// One registered provider: configuration, lifecycle state, live instance.
struct ProviderEntry {
    spec: RwLock<ProviderSpec>,
    descriptor: RwLock<ProviderDescriptor>,
    /// The live instance, swapped atomically on reload. In-flight dispatches
    /// keep their `Arc` clone, so replacement never interrupts a call.
    instance: ArcSwapOption<PluginInstance>,
    /// Serializes activate, reload and unload for this name. Names are
    /// independent; a slow activation of one provider never blocks another.
    activation: Mutex<()>,
}

/// Registry of provider plugins.
///
/// Lookups on the dispatch path (`resolve`, `record_success`,
/// `record_failure`) are lock-free reads over a [`DashMap`] and an
/// [`ArcSwapOption`]; lifecycle mutations go through a per-name async mutex.
pub struct ProviderRegistry {
    entries: DashMap<ProviderKey, Arc<ProviderEntry>>,
    factory: Arc<dyn ProviderFactory>,
    health: RwLock<HealthConfig>,
}

impl ProviderRegistry {
    /// An empty registry over the given factory. Call
    /// [`apply`](Self::apply) to register providers.
    #[must_use]
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            entries: DashMap::new(),
            factory,
            health: RwLock::new(HealthConfig::default()),
        }
    }

    /// Converge the registry onto `config`.
    ///
    /// New names are discovered, changed entries are re-discovered (their
    /// old instance keeps serving in-flight calls and is dropped from new
    /// lookups), removed names are unloaded. Entries whose spec is unchanged
    /// are left untouched. Providers marked `preload` are activated eagerly;
    /// a preload failure parks that descriptor and does not abort the rest.
    ///
    /// The health policy is replaced as a whole. A new `probe_interval` is
    /// picked up by the monitor on its next round; a new
    /// `max_concurrent_dispatches` applies to instances activated from here
    /// on, while already-running instances keep their limiter until they are
    /// reloaded or their spec changes.
    ///
    /// # Errors
    ///
    /// Fails only on a provider name that does not normalize into a key.
    pub async fn apply(&self, config: RegistryConfig) -> Result<(), RegistryError> {
        *self.health.write() = config.health.clone();

        let mut desired: Vec<(ProviderKey, ProviderSpec)> = Vec::with_capacity(config.providers.len());
        for spec in config.providers {
            let key: ProviderKey =
                spec.name.parse().map_err(|source| RegistryError::InvalidKey {
                    name: spec.name.clone(),
                    source,
                })?;
            desired.push((key, spec));
        }

        for (key, spec) in &desired {
            if let Some(entry) = self.entries.get(key).map(|e| Arc::clone(e.value())) {
                if *entry.spec.read() == *spec {
                    continue;
                }
                let _guard = entry.activation.lock().await;
                *entry.spec.write() = spec.clone();
                *entry.descriptor.write() = Self::discovered(key, spec);
                entry.instance.store(None);
                info!(provider = %key, "provider configuration changed, re-discovered");
            } else {
                self.entries.insert(
                    key.clone(),
                    Arc::new(ProviderEntry {
                        spec: RwLock::new(spec.clone()),
                        descriptor: RwLock::new(Self::discovered(key, spec)),
                        instance: ArcSwapOption::const_empty(),
                        activation: Mutex::new(()),
                    }),
                );
                debug!(provider = %key, "provider discovered");
            }
        }

        let removed: Vec<ProviderKey> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|key| !desired.iter().any(|(k, _)| k == key))
            .collect();
        for key in removed {
            let _ = self.unload(&key).await;
        }

        for (key, spec) in &desired {
            if spec.preload {
                if let Err(error) = self.ensure_loaded(key).await {
                    warn!(provider = %key, %error, "preload failed");
                }
            }
        }
        Ok(())
    }

    fn discovered(key: &ProviderKey, spec: &ProviderSpec) -> ProviderDescriptor {
        ProviderDescriptor::discovered(
            key.clone(),
            spec.capabilities,
            spec.location.clone(),
            spec.version.clone(),
        )
    }

    fn entry(&self, key: &ProviderKey) -> Result<Arc<ProviderEntry>, RegistryError> {
        self.entries
            .get(key)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| RegistryError::NotFound { key: key.clone() })
    }

    /// Make sure the provider is activated, performing lazy activation on
    /// the first call. Concurrent calls for the same name serialize on the
    /// per-name lock and construct at most one instance.
    ///
    /// A quarantined provider counts as loaded; `resolve` is what rejects
    /// it. A parked descriptor (failed validation or initialization) fails
    /// here without re-attempting, until `reload` or a config change.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`], [`RegistryError::Incompatible`] or
    /// [`RegistryError::InitFailed`].
    pub async fn ensure_loaded(&self, key: &ProviderKey) -> Result<(), RegistryError> {
        let entry = self.entry(key)?;
        if entry.descriptor.read().status() == ProviderStatus::Healthy {
            return Ok(());
        }

        let _guard = entry.activation.lock().await;
        // Re-check: a concurrent caller may have activated while we waited.
        let (status, parked) = {
            let descriptor = entry.descriptor.read();
            (descriptor.status(), descriptor.last_error().map(String::from))
        };
        match status {
            ProviderStatus::Healthy => Ok(()),
            ProviderStatus::Degraded => {
                if entry.instance.load().is_some() {
                    Ok(())
                } else {
                    Err(RegistryError::InitFailed {
                        key: key.clone(),
                        reason: parked.unwrap_or_else(|| "initialization failed".into()),
                    })
                }
            }
            ProviderStatus::Discovered if parked.is_some() => Err(RegistryError::Incompatible {
                key: key.clone(),
                reason: parked.unwrap_or_default(),
            }),
            _ => self.activate_locked(key, &entry).await,
        }
    }

    /// Build and validate an instance without touching registry state.
    async fn build_checked(
        &self,
        key: &ProviderKey,
        spec: &ProviderSpec,
    ) -> Result<(Arc<dyn Provider>, Version), RegistryError> {
        let provider = self.factory.build(spec).await.map_err(|error| {
            RegistryError::Incompatible {
                key: key.clone(),
                reason: error.to_string(),
            }
        })?;

        let metadata = provider.metadata();
        let incompatible = |reason: String| RegistryError::Incompatible {
            key: key.clone(),
            reason,
        };

        if metadata.key() != key {
            return Err(incompatible(format!(
                "implementation identifies as '{}'",
                metadata.key()
            )));
        }
        if !spec.version.matches(metadata.version()) {
            return Err(incompatible(format!(
                "version {} does not satisfy constraint {}",
                metadata.version(),
                spec.version
            )));
        }
        if !metadata.capabilities().contains_all(spec.capabilities) {
            return Err(incompatible(format!(
                "declared capabilities {} exceed implementation's {}",
                spec.capabilities,
                metadata.capabilities()
            )));
        }
        if !provider
            .implemented_capabilities()
            .contains_all(metadata.capabilities())
        {
            return Err(incompatible(format!(
                "metadata declares {} but implementation exposes {}",
                metadata.capabilities(),
                provider.implemented_capabilities()
            )));
        }

        let version = metadata.version().clone();
        Ok((provider, version))
    }

    /// First activation for a name. Caller holds the activation lock.
    async fn activate_locked(
        &self,
        key: &ProviderKey,
        entry: &ProviderEntry,
    ) -> Result<(), RegistryError> {
        let spec = entry.spec.read().clone();

        let (provider, version) = match self.build_checked(key, &spec).await {
            Ok(built) => built,
            Err(error) => {
                // Parked: stays Discovered, dispatches fail fast until the
                // configuration changes or an operator reloads.
                entry.descriptor.write().set_last_error(error.to_string());
                warn!(provider = %key, %error, "provider validation failed");
                return Err(error);
            }
        };

        {
            let mut descriptor = entry.descriptor.write();
            descriptor.set_resolved_version(version.clone());
            descriptor.clear_last_error();
            descriptor.transition(ProviderStatus::Validated);
            descriptor.transition(ProviderStatus::Activated);
        }

        match provider.initialize(&spec.config).await {
            Ok(()) => {
                let limit = self.health.read().max_concurrent_dispatches;
                entry
                    .instance
                    .store(Some(Arc::new(PluginInstance::new(provider, limit))));
                entry.descriptor.write().transition(ProviderStatus::Healthy);
                info!(provider = %key, %version, "provider activated");
                Ok(())
            }
            Err(error) => {
                let mut descriptor = entry.descriptor.write();
                descriptor.transition(ProviderStatus::Degraded);
                descriptor.set_last_error(error.to_string());
                warn!(provider = %key, %error, "provider initialization failed");
                Err(RegistryError::InitFailed {
                    key: key.clone(),
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Resolve the live instance for a dispatch. Lock-free read path;
    /// returns only instances currently in service.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] — name not registered;
    /// - [`RegistryError::Incompatible`] — parked after failed validation;
    /// - [`RegistryError::InitFailed`] — parked after failed `initialize`;
    /// - [`RegistryError::Unhealthy`] — quarantined pending a probe;
    /// - [`RegistryError::NotActivated`] — `ensure_loaded` was never called.
    pub fn resolve(&self, key: &ProviderKey) -> Result<Arc<PluginInstance>, RegistryError> {
        let entry = self.entry(key)?;
        let descriptor = entry.descriptor.read();
        match descriptor.status() {
            ProviderStatus::Healthy => {
                entry
                    .instance
                    .load_full()
                    .ok_or_else(|| RegistryError::NotActivated { key: key.clone() })
            }
            ProviderStatus::Degraded => {
                if entry.instance.load().is_some() {
                    Err(RegistryError::Unhealthy { key: key.clone() })
                } else {
                    Err(RegistryError::InitFailed {
                        key: key.clone(),
                        reason: descriptor
                            .last_error()
                            .unwrap_or("initialization failed")
                            .to_owned(),
                    })
                }
            }
            ProviderStatus::Discovered if descriptor.last_error().is_some() => {
                Err(RegistryError::Incompatible {
                    key: key.clone(),
                    reason: descriptor.last_error().unwrap_or_default().to_owned(),
                })
            }
            _ => Err(RegistryError::NotActivated { key: key.clone() }),
        }
    }

    /// Replace the instance with a freshly built and initialized one.
    ///
    /// The new instance is fully constructed and initialized before the
    /// swap, so other tasks see either the old healthy instance or the new
    /// one and never a half-activated state. On failure the previous
    /// instance, if any, keeps serving.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`], [`RegistryError::Incompatible`] or
    /// [`RegistryError::InitFailed`]; the registry state is unchanged apart
    /// from recorded diagnostics.
    pub async fn reload(&self, key: &ProviderKey) -> Result<(), RegistryError> {
        let entry = self.entry(key)?;
        let _guard = entry.activation.lock().await;
        let spec = entry.spec.read().clone();

        let (provider, version) = self.build_checked(key, &spec).await.inspect_err(|error| {
            entry.descriptor.write().set_last_error(error.to_string());
            warn!(provider = %key, %error, "reload validation failed, previous instance retained");
        })?;

        if let Err(error) = provider.initialize(&spec.config).await {
            entry.descriptor.write().set_last_error(error.to_string());
            warn!(provider = %key, %error, "reload initialization failed, previous instance retained");
            return Err(RegistryError::InitFailed {
                key: key.clone(),
                reason: error.to_string(),
            });
        }

        let limit = self.health.read().max_concurrent_dispatches;
        entry
            .instance
            .store(Some(Arc::new(PluginInstance::new(provider, limit))));
        {
            let mut descriptor = entry.descriptor.write();
            descriptor.set_resolved_version(version.clone());
            descriptor.clear_last_error();
            descriptor.transition(ProviderStatus::Validated);
            descriptor.transition(ProviderStatus::Activated);
            descriptor.transition(ProviderStatus::Healthy);
        }
        info!(provider = %key, %version, "provider reloaded");
        Ok(())
    }

    /// Remove a provider from service. In-flight dispatches holding an
    /// instance `Arc` finish undisturbed.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the name is not registered.
    pub async fn unload(&self, key: &ProviderKey) -> Result<(), RegistryError> {
        let entry = self.entry(key)?;
        let _guard = entry.activation.lock().await;
        entry.descriptor.write().transition(ProviderStatus::Unloaded);
        entry.instance.store(None);
        drop(_guard);
        self.entries.remove(key);
        info!(provider = %key, "provider unloaded");
        Ok(())
    }

    /// Unload every provider.
    pub async fn shutdown(&self) {
        let keys: Vec<ProviderKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            let _ = self.unload(&key).await;
        }
    }

    /// Snapshot of a provider's descriptor, for diagnostics and tests.
    #[must_use]
    pub fn descriptor(&self, key: &ProviderKey) -> Option<ProviderDescriptor> {
        self.entries.get(key).map(|e| e.descriptor.read().clone())
    }

    /// The currently applied health policy.
    #[must_use]
    pub fn health_config(&self) -> HealthConfig {
        self.health.read().clone()
    }

    /// Report a successful dispatch: resets the failure counter. A
    /// quarantined provider is not healed here; only a probe does that.
    pub fn record_success(&self, key: &ProviderKey) {
        if let Some(entry) = self.entries.get(key) {
            if let Some(instance) = entry.instance.load_full() {
                instance.reset_failures();
            }
        }
    }

    /// Report a failed dispatch. Crossing the configured threshold
    /// quarantines the provider.
    pub fn record_failure(&self, key: &ProviderKey) {
        let Some(entry) = self.entries.get(key).map(|e| Arc::clone(e.value())) else {
            return;
        };
        let Some(instance) = entry.instance.load_full() else {
            return;
        };
        let failures = instance.count_failure();
        let threshold = self.health.read().failure_threshold;
        if failures >= threshold {
            let mut descriptor = entry.descriptor.write();
            if descriptor.status() == ProviderStatus::Healthy {
                descriptor.transition(ProviderStatus::Degraded);
                warn!(
                    provider = %key,
                    consecutive_failures = failures,
                    "provider quarantined"
                );
            }
        }
    }

    /// Probe every quarantined provider once, flipping those that pass back
    /// to healthy. Normally driven by the background health monitor; exposed
    /// so hosts and tests can force a probe round.
    pub async fn probe_degraded(&self) {
        let probe_timeout = self.health.read().probe_timeout;
        let quarantined: Vec<(ProviderKey, Arc<ProviderEntry>, Arc<PluginInstance>)> = self
            .entries
            .iter()
            .filter(|e| e.descriptor.read().status() == ProviderStatus::Degraded)
            .filter_map(|e| {
                e.instance
                    .load_full()
                    .map(|instance| (e.key().clone(), Arc::clone(e.value()), instance))
            })
            .collect();

        for (key, entry, instance) in quarantined {
            let probed =
                tokio::time::timeout(probe_timeout, instance.provider().health_probe()).await;
            instance.record_probe();
            match probed {
                Ok(Ok(())) => {
                    instance.reset_failures();
                    let mut descriptor = entry.descriptor.write();
                    // Probe writes only this provider's own status.
                    if descriptor.transition(ProviderStatus::Healthy) {
                        info!(provider = %key, "provider recovered, back in service");
                    }
                }
                Ok(Err(error)) => {
                    debug!(provider = %key, %error, "health probe failed");
                }
                Err(_) => {
                    debug!(provider = %key, "health probe timed out");
                }
            }
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.entries.len())
            .finish_non_exhaustive()
    }
}
