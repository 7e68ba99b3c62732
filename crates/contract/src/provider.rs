//! The base `Provider` trait.

use async_trait::async_trait;
use strato_core::{Capability, CapabilitySet, ProviderKey};

use crate::{
    ClusterProvider, ComputeProvider, CostEstimator, IamProvider, NetworkProvider, ProviderConfig,
    ProviderError, ProviderMetadata,
};

/// Base trait every cloud backend implements.
///
/// A provider is identified by its [`ProviderMetadata`] and exposes its
/// optional capability interfaces through the accessor methods. The accessors
/// return `None` for capabilities the backend does not implement; the
/// registry checks at activation that every *declared* capability has an
/// implementation, so the router never probes accessors per call.
///
/// This trait is **object-safe** so providers can be stored as
/// `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Static identity: key, version, declared capabilities.
    fn metadata(&self) -> &ProviderMetadata;

    /// One-time initialization, called exactly once during activation with
    /// the host's configuration map for this provider. A provider that
    /// returns an error here is parked as degraded and never dispatched to.
    async fn initialize(&self, config: &ProviderConfig) -> Result<(), ProviderError>;

    /// Lightweight no-op call used by the health monitor to decide whether a
    /// quarantined provider has recovered. The default succeeds, which is
    /// right for backends whose failures are per-call rather than systemic.
    async fn health_probe(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// The compute interface, if implemented.
    fn compute(&self) -> Option<&dyn ComputeProvider> {
        None
    }

    /// The network interface, if implemented.
    fn network(&self) -> Option<&dyn NetworkProvider> {
        None
    }

    /// The IAM interface, if implemented.
    fn iam(&self) -> Option<&dyn IamProvider> {
        None
    }

    /// The cluster interface, if implemented.
    fn cluster(&self) -> Option<&dyn ClusterProvider> {
        None
    }

    /// The cost-estimate interface, if implemented.
    fn cost_estimate(&self) -> Option<&dyn CostEstimator> {
        None
    }

    /// The normalized unique key identifying this backend.
    fn key(&self) -> &ProviderKey {
        self.metadata().key()
    }

    /// Capabilities that actually have an implementation behind them,
    /// computed from the accessors. Registry validation checks the declared
    /// set against this.
    fn implemented_capabilities(&self) -> CapabilitySet {
        let mut set = CapabilitySet::empty();
        if self.compute().is_some() {
            set.insert(Capability::Compute);
        }
        if self.network().is_some() {
            set.insert(Capability::Network);
        }
        if self.iam().is_some() {
            set.insert(Capability::Iam);
        }
        if self.cluster().is_some() {
            set.insert(Capability::Cluster);
        }
        if self.cost_estimate().is_some() {
            set.insert(Capability::CostEstimate);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use semver::Version;

    use super::*;
    use crate::{CredentialPayload, Instance, InstanceSpec, InstanceState};

    /// Minimal compute-only provider for trait-surface tests.
    struct StubCompute;

    #[async_trait]
    impl ComputeProvider for StubCompute {
        async fn create_instance(
            &self,
            _credential: &CredentialPayload,
            spec: &InstanceSpec,
        ) -> Result<Instance, ProviderError> {
            Ok(Instance {
                id: "i-0".into(),
                name: spec.name.clone(),
                state: InstanceState::Pending,
                machine_type: spec.machine_type.clone(),
                region: spec.region.clone(),
                private_ip: None,
                public_ip: None,
                launched_at: None,
                tags: spec.tags.clone(),
            })
        }

        async fn get_instance(
            &self,
            _credential: &CredentialPayload,
            instance_id: &str,
        ) -> Result<Instance, ProviderError> {
            Err(ProviderError::NotFound(instance_id.to_owned()))
        }

        async fn delete_instance(
            &self,
            _credential: &CredentialPayload,
            _instance_id: &str,
        ) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn start_instance(
            &self,
            _credential: &CredentialPayload,
            instance_id: &str,
        ) -> Result<Instance, ProviderError> {
            Err(ProviderError::NotFound(instance_id.to_owned()))
        }

        async fn stop_instance(
            &self,
            _credential: &CredentialPayload,
            instance_id: &str,
        ) -> Result<Instance, ProviderError> {
            Err(ProviderError::NotFound(instance_id.to_owned()))
        }

        async fn instance_status(
            &self,
            _credential: &CredentialPayload,
            _instance_id: &str,
        ) -> Result<InstanceState, ProviderError> {
            Ok(InstanceState::Unknown)
        }
    }

    struct StubProvider {
        meta: ProviderMetadata,
        compute: StubCompute,
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn metadata(&self) -> &ProviderMetadata {
            &self.meta
        }

        async fn initialize(&self, _config: &ProviderConfig) -> Result<(), ProviderError> {
            Ok(())
        }

        fn compute(&self) -> Option<&dyn ComputeProvider> {
            Some(&self.compute)
        }
    }

    fn stub() -> StubProvider {
        StubProvider {
            meta: ProviderMetadata::builder("aws", Version::new(1, 0, 0))
                .capability(Capability::Compute)
                .build()
                .unwrap(),
            compute: StubCompute,
        }
    }

    #[test]
    fn object_safety() {
        let provider: Arc<dyn Provider> = Arc::new(stub());
        assert_eq!(provider.key().as_str(), "aws");
    }

    #[test]
    fn implemented_capabilities_follow_accessors() {
        let provider = stub();
        let implemented = provider.implemented_capabilities();
        assert!(implemented.contains(Capability::Compute));
        assert!(!implemented.contains(Capability::Network));
        assert_eq!(implemented.len(), 1);
    }
}
