//! Construction seam between the registry and provider implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use strato_contract::Provider;

use crate::{ProviderLocation, ProviderSpec};

/// Error from building a provider instance.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider construction failed: {0}")]
pub struct FactoryError(pub String);

/// Builds provider instances for the registry.
///
/// The registry never constructs providers itself; the host injects a
/// factory at registry construction. This keeps backend crates out of the
/// registry's dependency graph and gives tests a seam for stub providers.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Build a fresh, uninitialized instance for `spec`.
    ///
    /// Called under the per-name activation lock, once per activation or
    /// reload. A factory that cannot serve the spec's location or name
    /// returns an error; the registry parks the descriptor as incompatible.
    async fn build(&self, spec: &ProviderSpec) -> Result<Arc<dyn Provider>, FactoryError>;
}

/// Constructor function for one in-process provider.
pub type ProviderConstructor =
    Box<dyn Fn(&ProviderSpec) -> Result<Arc<dyn Provider>, FactoryError> + Send + Sync>;

/// In-process factory over a fixed table of named constructors.
///
/// Hosts register one constructor per backend crate at startup. Remote
/// locations are rejected; a host that runs out-of-process plugins supplies
/// its own [`ProviderFactory`] instead.
#[derive(Default)]
pub struct InProcessFactory {
    constructors: HashMap<String, ProviderConstructor>,
}

impl InProcessFactory {
    /// An empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a provider name.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&ProviderSpec) -> Result<Arc<dyn Provider>, FactoryError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }
}

#[async_trait]
impl ProviderFactory for InProcessFactory {
    async fn build(&self, spec: &ProviderSpec) -> Result<Arc<dyn Provider>, FactoryError> {
        if let ProviderLocation::Remote { endpoint } = &spec.location {
            return Err(FactoryError(format!(
                "remote location '{endpoint}' requires a remote-capable factory"
            )));
        }
        let constructor = self.constructors.get(&spec.name).ok_or_else(|| {
            FactoryError(format!("no constructor registered for '{}'", spec.name))
        })?;
        constructor(spec)
    }
}

impl std::fmt::Debug for InProcessFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessFactory")
            .field("constructors", &self.constructors.keys())
            .finish()
    }
}
