//! The five-step dispatch pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use strato_contract::{
    ClusterRequest, ComputeRequest, CostRequest, CredentialPayload, IamRequest, NetworkRequest,
    OperationOutcome, OperationRequest, Provider, ProviderError,
};
use strato_core::{Capability, CredentialId, ProviderKey};
use strato_registry::{ProviderRegistry, RegistryError};
use strato_vault::{CredentialVault, VaultError};
use tracing::{debug, warn};

use crate::{AuditRecord, AuditSink, DispatchError, RoutingRequest};

/// Router policy knobs.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Extra time past the caller's deadline before the backend call is
    /// abandoned, absorbing clock skew between caller and router.
    pub grace: Duration,
    /// Whether read operations are retried once after a timeout. Mutating
    /// operations are never silently retried regardless of this setting.
    pub retry_reads: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(2),
            retry_reads: true,
        }
    }
}

/// Routes operations to providers.
///
/// Each dispatch runs the same pipeline: registry lookup, capability check,
/// credential resolution, bounded backend invocation, outcome
/// normalization. Exactly one [`AuditRecord`] is emitted per dispatch,
/// success or failure.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    vault: Arc<CredentialVault>,
    audit: Arc<dyn AuditSink>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Build a dispatcher with default [`DispatcherConfig`].
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        vault: Arc<CredentialVault>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            registry,
            vault,
            audit,
            config: DispatcherConfig::default(),
        }
    }

    /// Override the policy knobs.
    #[must_use]
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute one routed operation.
    ///
    /// # Errors
    ///
    /// A [`DispatchError`]; callers branch on
    /// [`code`](DispatchError::code).
    pub async fn dispatch(
        &self,
        request: RoutingRequest,
    ) -> Result<OperationOutcome, DispatchError> {
        let started = Instant::now();
        let result = self.dispatch_inner(&request).await;

        if let Err(error) = &result {
            debug!(
                workspace_id = %request.workspace_id,
                provider = %request.provider,
                operation = request.operation.name(),
                code = error.code(),
                "dispatch failed"
            );
        }
        self.audit.record(AuditRecord {
            workspace_id: request.workspace_id,
            provider: request.provider.clone(),
            capability: request.operation.capability(),
            operation: request.operation.name(),
            credential_id: request.credential_id,
            success: result.is_ok(),
            error_code: result.as_ref().err().map(DispatchError::code),
            duration: started.elapsed(),
            occurred_at: Utc::now(),
        });
        result
    }

    async fn dispatch_inner(
        &self,
        request: &RoutingRequest,
    ) -> Result<OperationOutcome, DispatchError> {
        let key = &request.provider;

        // 1. Locate a serving instance, activating lazily on first use.
        self.registry
            .ensure_loaded(key)
            .await
            .map_err(|error| map_registry(key, error))?;
        let instance = self
            .registry
            .resolve(key)
            .map_err(|error| map_registry(key, error))?;

        // 2. Capability check against the host's declared set, not the
        // implementation's accessors.
        let capability = request.operation.capability();
        let declared = self
            .registry
            .descriptor(key)
            .map(|descriptor| descriptor.capabilities())
            .unwrap_or_default();
        if !declared.contains(capability) {
            return Err(DispatchError::CapabilityUnsupported {
                provider: key.clone(),
                capability,
            });
        }

        // 3. Resolve the credential; decrypted only from here to the end of
        // this call, zeroized on drop.
        let credential = self
            .vault
            .resolve(request.workspace_id, key, request.credential_id)
            .await
            .map_err(|error| map_vault(request.credential_id, error))?;

        // 4. Bounded invocation under the per-provider concurrency cap.
        let _permit =
            instance
                .limiter()
                .acquire()
                .await
                .map_err(|_| DispatchError::Internal {
                    provider: key.clone(),
                    message: "provider dispatch limiter closed".into(),
                })?;
        let provider = Arc::clone(instance.provider());

        let mut first_attempt = true;
        loop {
            let budget =
                request.deadline.saturating_duration_since(Instant::now()) + self.config.grace;
            let call = invoke(provider.as_ref(), &credential, &request.operation);
            match tokio::time::timeout(budget, call).await {
                Ok(Ok(outcome)) => {
                    self.registry.record_success(key);
                    return Ok(outcome);
                }
                Ok(Err(InvokeFailure::Backend(error))) => {
                    // Transport-level faults count against health; auth,
                    // quota and validation rejections mean the backend is
                    // responsive and the request is the problem.
                    if matches!(
                        error,
                        ProviderError::Unavailable(_) | ProviderError::Internal(_)
                    ) {
                        self.registry.record_failure(key);
                    }
                    return Err(map_provider(key, &error));
                }
                Ok(Err(InvokeFailure::MissingInterface(capability))) => {
                    // Activation validates accessors against declared
                    // capabilities, so this is a registry invariant break.
                    warn!(provider = %key, %capability, "declared capability has no interface");
                    return Err(DispatchError::Internal {
                        provider: key.clone(),
                        message: format!("no interface behind declared capability '{capability}'"),
                    });
                }
                Err(_elapsed) => {
                    // 5. Timeout: dropping the future cancels the call.
                    // Every timed-out attempt counts against health.
                    self.registry.record_failure(key);
                    if self.config.retry_reads && request.operation.is_read() && first_attempt {
                        first_attempt = false;
                        debug!(
                            provider = %key,
                            operation = request.operation.name(),
                            "read timed out, retrying once"
                        );
                        continue;
                    }
                    return Err(DispatchError::Timeout {
                        provider: key.clone(),
                        operation: request.operation.name(),
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn map_registry(requested: &ProviderKey, error: RegistryError) -> DispatchError {
    match error {
        RegistryError::NotFound { key } => DispatchError::ProviderNotFound { provider: key },
        RegistryError::Incompatible { key, reason } => DispatchError::ProviderIncompatible {
            provider: key,
            reason,
        },
        RegistryError::InitFailed { key, reason } => DispatchError::ProviderInitFailed {
            provider: key,
            reason,
        },
        RegistryError::Unhealthy { key } => DispatchError::ProviderUnhealthy { provider: key },
        RegistryError::NotActivated { key } => DispatchError::Internal {
            provider: key,
            message: "provider resolved before activation".into(),
        },
        // Only produced by `apply`, never by the dispatch-path lookups.
        RegistryError::InvalidKey { name, source } => DispatchError::Internal {
            provider: requested.clone(),
            message: format!("invalid provider name '{name}': {source}"),
        },
    }
}

fn map_vault(credential_id: CredentialId, error: VaultError) -> DispatchError {
    match error {
        VaultError::NotFound { credential_id, .. } => DispatchError::CredentialInvalid {
            credential_id,
            reason: "credential not found".into(),
        },
        VaultError::ProviderMismatch {
            credential_id,
            bound,
            requested,
        } => DispatchError::CredentialMismatch {
            credential_id,
            bound,
            requested,
        },
        VaultError::Malformed { credential_id } => DispatchError::CredentialInvalid {
            credential_id,
            reason: "credential payload is malformed".into(),
        },
        VaultError::InvalidPayload {
            credential_id,
            source,
        } => DispatchError::CredentialInvalid {
            credential_id,
            reason: source.to_string(),
        },
        VaultError::Crypto(source) => DispatchError::CredentialInvalid {
            credential_id,
            reason: source.to_string(),
        },
        VaultError::Repository(source) => DispatchError::CredentialInvalid {
            credential_id,
            reason: source.to_string(),
        },
    }
}

fn map_provider(key: &ProviderKey, error: &ProviderError) -> DispatchError {
    match error {
        ProviderError::Auth(message) => DispatchError::AuthError {
            provider: key.clone(),
            message: message.clone(),
        },
        ProviderError::QuotaExceeded(message) => DispatchError::QuotaExceeded {
            provider: key.clone(),
            message: message.clone(),
        },
        other => DispatchError::Internal {
            provider: key.clone(),
            message: format!("{}: {other}", other.category()),
        },
    }
}

enum InvokeFailure {
    Backend(ProviderError),
    MissingInterface(Capability),
}

impl From<ProviderError> for InvokeFailure {
    fn from(error: ProviderError) -> Self {
        Self::Backend(error)
    }
}

/// Invoke the capability method matching `operation` and normalize the
/// result. One arm per contract operation; the shape of this match is the
/// router's whole knowledge of the contract surface.
#[allow(clippy::too_many_lines)]
async fn invoke(
    provider: &dyn Provider,
    credential: &CredentialPayload,
    operation: &OperationRequest,
) -> Result<OperationOutcome, InvokeFailure> {
    match operation {
        OperationRequest::Compute(request) => {
            let compute = provider
                .compute()
                .ok_or(InvokeFailure::MissingInterface(Capability::Compute))?;
            Ok(match request {
                ComputeRequest::CreateInstance(spec) => {
                    OperationOutcome::Instance(compute.create_instance(credential, spec).await?)
                }
                ComputeRequest::GetInstance { instance_id } => {
                    OperationOutcome::Instance(compute.get_instance(credential, instance_id).await?)
                }
                ComputeRequest::DeleteInstance { instance_id } => {
                    compute.delete_instance(credential, instance_id).await?;
                    OperationOutcome::Done
                }
                ComputeRequest::StartInstance { instance_id } => OperationOutcome::Instance(
                    compute.start_instance(credential, instance_id).await?,
                ),
                ComputeRequest::StopInstance { instance_id } => {
                    OperationOutcome::Instance(compute.stop_instance(credential, instance_id).await?)
                }
                ComputeRequest::InstanceStatus { instance_id } => OperationOutcome::InstanceState(
                    compute.instance_status(credential, instance_id).await?,
                ),
            })
        }
        OperationRequest::Network(request) => {
            let network = provider
                .network()
                .ok_or(InvokeFailure::MissingInterface(Capability::Network))?;
            Ok(match request {
                NetworkRequest::CreateVpc(spec) => {
                    OperationOutcome::Vpc(network.create_vpc(credential, spec).await?)
                }
                NetworkRequest::GetVpc { vpc_id } => {
                    OperationOutcome::Vpc(network.get_vpc(credential, vpc_id).await?)
                }
                NetworkRequest::ListVpcs => {
                    OperationOutcome::Vpcs(network.list_vpcs(credential).await?)
                }
                NetworkRequest::DeleteVpc { vpc_id } => {
                    network.delete_vpc(credential, vpc_id).await?;
                    OperationOutcome::Done
                }
                NetworkRequest::CreateSubnet(spec) => {
                    OperationOutcome::Subnet(network.create_subnet(credential, spec).await?)
                }
                NetworkRequest::GetSubnet { subnet_id } => {
                    OperationOutcome::Subnet(network.get_subnet(credential, subnet_id).await?)
                }
                NetworkRequest::ListSubnets { vpc_id } => {
                    OperationOutcome::Subnets(network.list_subnets(credential, vpc_id).await?)
                }
                NetworkRequest::DeleteSubnet { subnet_id } => {
                    network.delete_subnet(credential, subnet_id).await?;
                    OperationOutcome::Done
                }
                NetworkRequest::CreateSecurityGroup(spec) => OperationOutcome::SecurityGroup(
                    network.create_security_group(credential, spec).await?,
                ),
                NetworkRequest::GetSecurityGroup { group_id } => OperationOutcome::SecurityGroup(
                    network.get_security_group(credential, group_id).await?,
                ),
                NetworkRequest::ListSecurityGroups { vpc_id } => OperationOutcome::SecurityGroups(
                    network.list_security_groups(credential, vpc_id).await?,
                ),
                NetworkRequest::DeleteSecurityGroup { group_id } => {
                    network.delete_security_group(credential, group_id).await?;
                    OperationOutcome::Done
                }
                NetworkRequest::AuthorizeRule { group_id, rule } => OperationOutcome::SecurityGroup(
                    network.authorize_rule(credential, group_id, rule).await?,
                ),
                NetworkRequest::RevokeRule { group_id, rule } => OperationOutcome::SecurityGroup(
                    network.revoke_rule(credential, group_id, rule).await?,
                ),
                NetworkRequest::ImportKeyPair(spec) => {
                    OperationOutcome::KeyPair(network.import_key_pair(credential, spec).await?)
                }
                NetworkRequest::ListKeyPairs => {
                    OperationOutcome::KeyPairs(network.list_key_pairs(credential).await?)
                }
                NetworkRequest::DeleteKeyPair { name } => {
                    network.delete_key_pair(credential, name).await?;
                    OperationOutcome::Done
                }
                NetworkRequest::CreateLoadBalancer(spec) => OperationOutcome::LoadBalancer(
                    network.create_load_balancer(credential, spec).await?,
                ),
                NetworkRequest::GetLoadBalancer { lb_id } => OperationOutcome::LoadBalancer(
                    network.get_load_balancer(credential, lb_id).await?,
                ),
                NetworkRequest::ListLoadBalancers => {
                    OperationOutcome::LoadBalancers(network.list_load_balancers(credential).await?)
                }
                NetworkRequest::DeleteLoadBalancer { lb_id } => {
                    network.delete_load_balancer(credential, lb_id).await?;
                    OperationOutcome::Done
                }
            })
        }
        OperationRequest::Iam(request) => {
            let iam = provider
                .iam()
                .ok_or(InvokeFailure::MissingInterface(Capability::Iam))?;
            Ok(match request {
                IamRequest::CreateRole(spec) => {
                    OperationOutcome::Role(iam.create_role(credential, spec).await?)
                }
                IamRequest::GetRole { name } => {
                    OperationOutcome::Role(iam.get_role(credential, name).await?)
                }
                IamRequest::ListRoles => OperationOutcome::Roles(iam.list_roles(credential).await?),
                IamRequest::DeleteRole { name } => {
                    iam.delete_role(credential, name).await?;
                    OperationOutcome::Done
                }
                IamRequest::AttachPolicy {
                    role_name,
                    policy_id,
                } => OperationOutcome::Role(
                    iam.attach_policy(credential, role_name, policy_id).await?,
                ),
                IamRequest::DetachPolicy {
                    role_name,
                    policy_id,
                } => OperationOutcome::Role(
                    iam.detach_policy(credential, role_name, policy_id).await?,
                ),
            })
        }
        OperationRequest::Cluster(request) => {
            let cluster = provider
                .cluster()
                .ok_or(InvokeFailure::MissingInterface(Capability::Cluster))?;
            Ok(match request {
                ClusterRequest::CreateCluster(spec) => {
                    OperationOutcome::Cluster(cluster.create_cluster(credential, spec).await?)
                }
                ClusterRequest::GetCluster { cluster_id } => {
                    OperationOutcome::Cluster(cluster.get_cluster(credential, cluster_id).await?)
                }
                ClusterRequest::ListClusters => {
                    OperationOutcome::Clusters(cluster.list_clusters(credential).await?)
                }
                ClusterRequest::DeleteCluster { cluster_id } => {
                    cluster.delete_cluster(credential, cluster_id).await?;
                    OperationOutcome::Done
                }
                ClusterRequest::CreateNodePool { cluster_id, spec } => OperationOutcome::NodePool(
                    cluster.create_node_pool(credential, cluster_id, spec).await?,
                ),
                ClusterRequest::ListNodePools { cluster_id } => OperationOutcome::NodePools(
                    cluster.list_node_pools(credential, cluster_id).await?,
                ),
                ClusterRequest::ScaleNodePool {
                    cluster_id,
                    pool_id,
                    desired_size,
                } => OperationOutcome::NodePool(
                    cluster
                        .scale_node_pool(credential, cluster_id, pool_id, *desired_size)
                        .await?,
                ),
                ClusterRequest::DeleteNodePool {
                    cluster_id,
                    pool_id,
                } => {
                    cluster.delete_node_pool(credential, cluster_id, pool_id).await?;
                    OperationOutcome::Done
                }
            })
        }
        OperationRequest::CostEstimate(CostRequest::Estimate(query)) => {
            let estimator = provider
                .cost_estimate()
                .ok_or(InvokeFailure::MissingInterface(Capability::CostEstimate))?;
            Ok(OperationOutcome::CostEstimate(
                estimator.estimate(credential, query).await?,
            ))
        }
    }
}
