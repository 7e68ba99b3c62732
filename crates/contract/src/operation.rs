//! Typed unions over every contract operation and result.
//!
//! Domain services build an [`OperationRequest`]; the router inspects its
//! capability and read/mutate classification, then invokes the matching
//! capability method and wraps the result in an [`OperationOutcome`].

use serde::{Deserialize, Serialize};
use strato_core::Capability;

use crate::{
    Cluster, ClusterSpec, CostEstimate, CostQuery, Instance, InstanceSpec, InstanceState, KeyPair,
    KeyPairSpec, LoadBalancer, LoadBalancerSpec, NodePool, NodePoolSpec, Role, RoleSpec,
    SecurityGroup, SecurityGroupRule, SecurityGroupSpec, Subnet, SubnetSpec, Vpc, VpcSpec,
};

/// Compute operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ComputeRequest {
    /// Create a virtual machine.
    CreateInstance(InstanceSpec),
    /// Fetch an instance.
    GetInstance {
        /// Vendor instance id.
        instance_id: String,
    },
    /// Terminate an instance.
    DeleteInstance {
        /// Vendor instance id.
        instance_id: String,
    },
    /// Start a stopped instance.
    StartInstance {
        /// Vendor instance id.
        instance_id: String,
    },
    /// Stop a running instance.
    StopInstance {
        /// Vendor instance id.
        instance_id: String,
    },
    /// State-only lookup.
    InstanceStatus {
        /// Vendor instance id.
        instance_id: String,
    },
}

/// Network operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // variant meaning matches the NetworkProvider method of the same name
pub enum NetworkRequest {
    CreateVpc(VpcSpec),
    GetVpc { vpc_id: String },
    ListVpcs,
    DeleteVpc { vpc_id: String },
    CreateSubnet(SubnetSpec),
    GetSubnet { subnet_id: String },
    ListSubnets { vpc_id: String },
    DeleteSubnet { subnet_id: String },
    CreateSecurityGroup(SecurityGroupSpec),
    GetSecurityGroup { group_id: String },
    ListSecurityGroups { vpc_id: String },
    DeleteSecurityGroup { group_id: String },
    AuthorizeRule { group_id: String, rule: SecurityGroupRule },
    RevokeRule { group_id: String, rule: SecurityGroupRule },
    ImportKeyPair(KeyPairSpec),
    ListKeyPairs,
    DeleteKeyPair { name: String },
    CreateLoadBalancer(LoadBalancerSpec),
    GetLoadBalancer { lb_id: String },
    ListLoadBalancers,
    DeleteLoadBalancer { lb_id: String },
}

/// IAM operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // variant meaning matches the IamProvider method of the same name
pub enum IamRequest {
    CreateRole(RoleSpec),
    GetRole { name: String },
    ListRoles,
    DeleteRole { name: String },
    AttachPolicy { role_name: String, policy_id: String },
    DetachPolicy { role_name: String, policy_id: String },
}

/// Cluster operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // variant meaning matches the ClusterProvider method of the same name
pub enum ClusterRequest {
    CreateCluster(ClusterSpec),
    GetCluster { cluster_id: String },
    ListClusters,
    DeleteCluster { cluster_id: String },
    CreateNodePool { cluster_id: String, spec: NodePoolSpec },
    ListNodePools { cluster_id: String },
    ScaleNodePool {
        cluster_id: String,
        pool_id: String,
        desired_size: u32,
    },
    DeleteNodePool { cluster_id: String, pool_id: String },
}

/// Cost-estimate operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CostRequest {
    /// Price a planned resource.
    Estimate(CostQuery),
}

/// One routed operation, grouped by capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "capability", content = "request", rename_all = "snake_case")]
pub enum OperationRequest {
    /// A compute operation.
    Compute(ComputeRequest),
    /// A network operation.
    Network(NetworkRequest),
    /// An IAM operation.
    Iam(IamRequest),
    /// A cluster operation.
    Cluster(ClusterRequest),
    /// A cost-estimate operation.
    CostEstimate(CostRequest),
}

impl OperationRequest {
    /// The capability this operation belongs to.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        match self {
            Self::Compute(_) => Capability::Compute,
            Self::Network(_) => Capability::Network,
            Self::Iam(_) => Capability::Iam,
            Self::Cluster(_) => Capability::Cluster,
            Self::CostEstimate(_) => Capability::CostEstimate,
        }
    }

    /// Stable snake_case operation name, used in audit records and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Compute(req) => match req {
                ComputeRequest::CreateInstance(_) => "create_instance",
                ComputeRequest::GetInstance { .. } => "get_instance",
                ComputeRequest::DeleteInstance { .. } => "delete_instance",
                ComputeRequest::StartInstance { .. } => "start_instance",
                ComputeRequest::StopInstance { .. } => "stop_instance",
                ComputeRequest::InstanceStatus { .. } => "instance_status",
            },
            Self::Network(req) => match req {
                NetworkRequest::CreateVpc(_) => "create_vpc",
                NetworkRequest::GetVpc { .. } => "get_vpc",
                NetworkRequest::ListVpcs => "list_vpcs",
                NetworkRequest::DeleteVpc { .. } => "delete_vpc",
                NetworkRequest::CreateSubnet(_) => "create_subnet",
                NetworkRequest::GetSubnet { .. } => "get_subnet",
                NetworkRequest::ListSubnets { .. } => "list_subnets",
                NetworkRequest::DeleteSubnet { .. } => "delete_subnet",
                NetworkRequest::CreateSecurityGroup(_) => "create_security_group",
                NetworkRequest::GetSecurityGroup { .. } => "get_security_group",
                NetworkRequest::ListSecurityGroups { .. } => "list_security_groups",
                NetworkRequest::DeleteSecurityGroup { .. } => "delete_security_group",
                NetworkRequest::AuthorizeRule { .. } => "authorize_rule",
                NetworkRequest::RevokeRule { .. } => "revoke_rule",
                NetworkRequest::ImportKeyPair(_) => "import_key_pair",
                NetworkRequest::ListKeyPairs => "list_key_pairs",
                NetworkRequest::DeleteKeyPair { .. } => "delete_key_pair",
                NetworkRequest::CreateLoadBalancer(_) => "create_load_balancer",
                NetworkRequest::GetLoadBalancer { .. } => "get_load_balancer",
                NetworkRequest::ListLoadBalancers => "list_load_balancers",
                NetworkRequest::DeleteLoadBalancer { .. } => "delete_load_balancer",
            },
            Self::Iam(req) => match req {
                IamRequest::CreateRole(_) => "create_role",
                IamRequest::GetRole { .. } => "get_role",
                IamRequest::ListRoles => "list_roles",
                IamRequest::DeleteRole { .. } => "delete_role",
                IamRequest::AttachPolicy { .. } => "attach_policy",
                IamRequest::DetachPolicy { .. } => "detach_policy",
            },
            Self::Cluster(req) => match req {
                ClusterRequest::CreateCluster(_) => "create_cluster",
                ClusterRequest::GetCluster { .. } => "get_cluster",
                ClusterRequest::ListClusters => "list_clusters",
                ClusterRequest::DeleteCluster { .. } => "delete_cluster",
                ClusterRequest::CreateNodePool { .. } => "create_node_pool",
                ClusterRequest::ListNodePools { .. } => "list_node_pools",
                ClusterRequest::ScaleNodePool { .. } => "scale_node_pool",
                ClusterRequest::DeleteNodePool { .. } => "delete_node_pool",
            },
            Self::CostEstimate(CostRequest::Estimate(_)) => "estimate_cost",
        }
    }

    /// Whether the operation is an idempotent read.
    ///
    /// Reads may be retried once on a transient timeout; mutating operations
    /// are never silently retried — a retry could duplicate a cloud resource.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        match self {
            Self::Compute(req) => matches!(
                req,
                ComputeRequest::GetInstance { .. } | ComputeRequest::InstanceStatus { .. }
            ),
            Self::Network(req) => matches!(
                req,
                NetworkRequest::GetVpc { .. }
                    | NetworkRequest::ListVpcs
                    | NetworkRequest::GetSubnet { .. }
                    | NetworkRequest::ListSubnets { .. }
                    | NetworkRequest::GetSecurityGroup { .. }
                    | NetworkRequest::ListSecurityGroups { .. }
                    | NetworkRequest::ListKeyPairs
                    | NetworkRequest::GetLoadBalancer { .. }
                    | NetworkRequest::ListLoadBalancers
            ),
            Self::Iam(req) => matches!(req, IamRequest::GetRole { .. } | IamRequest::ListRoles),
            Self::Cluster(req) => matches!(
                req,
                ClusterRequest::GetCluster { .. }
                    | ClusterRequest::ListClusters
                    | ClusterRequest::ListNodePools { .. }
            ),
            // Estimation never mutates vendor state.
            Self::CostEstimate(_) => true,
        }
    }
}

/// Normalized result of a routed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[allow(missing_docs)] // variants are carriers for the DTO of the same name
pub enum OperationOutcome {
    Instance(Instance),
    InstanceState(InstanceState),
    Vpc(Vpc),
    Vpcs(Vec<Vpc>),
    Subnet(Subnet),
    Subnets(Vec<Subnet>),
    SecurityGroup(SecurityGroup),
    SecurityGroups(Vec<SecurityGroup>),
    KeyPair(KeyPair),
    KeyPairs(Vec<KeyPair>),
    LoadBalancer(LoadBalancer),
    LoadBalancers(Vec<LoadBalancer>),
    Role(Role),
    Roles(Vec<Role>),
    Cluster(Cluster),
    Clusters(Vec<Cluster>),
    NodePool(NodePool),
    NodePools(Vec<NodePool>),
    CostEstimate(CostEstimate),
    /// The operation completed and has no resource to return (deletes).
    Done,
}
