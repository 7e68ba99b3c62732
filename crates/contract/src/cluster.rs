//! Cluster capability: managed container clusters and node pools.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CredentialPayload, ProviderError};

/// Request to create a managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Display name.
    pub name: String,
    /// Requested control-plane version, vendor default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Region to create the cluster in.
    pub region: String,
    /// Subnets the cluster network spans.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<String>,
}

/// Lifecycle state of a cluster, normalized across vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    /// Control plane is being provisioned.
    Creating,
    /// Ready for workloads.
    Active,
    /// Upgrade or reconfiguration in progress.
    Updating,
    /// Teardown in progress.
    Deleting,
    /// Provisioning or update failed.
    Failed,
}

/// A managed cluster as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Vendor resource identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Control-plane version.
    pub version: String,
    /// Normalized lifecycle state.
    pub state: ClusterState,
    /// API endpoint, once provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Creation timestamp, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request to create a node pool in a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePoolSpec {
    /// Pool name, unique within the cluster.
    pub name: String,
    /// Machine type for pool nodes.
    pub machine_type: String,
    /// Desired node count.
    pub desired_size: u32,
    /// Autoscaling floor, if the vendor supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    /// Autoscaling ceiling, if the vendor supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
}

/// Lifecycle state of a node pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodePoolState {
    /// Being provisioned or resized.
    Provisioning,
    /// All nodes ready.
    Ready,
    /// Teardown in progress.
    Deleting,
    /// Provisioning or resize failed.
    Failed,
}

/// A node pool as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePool {
    /// Vendor resource identifier.
    pub id: String,
    /// Pool name.
    pub name: String,
    /// Machine type of pool nodes.
    pub machine_type: String,
    /// Desired node count.
    pub desired_size: u32,
    /// Normalized lifecycle state.
    pub state: NodePoolState,
}

/// Managed-cluster operations.
#[async_trait]
pub trait ClusterProvider: Send + Sync {
    /// Create a cluster.
    async fn create_cluster(
        &self,
        credential: &CredentialPayload,
        spec: &ClusterSpec,
    ) -> Result<Cluster, ProviderError>;

    /// Fetch a cluster by id.
    async fn get_cluster(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
    ) -> Result<Cluster, ProviderError>;

    /// List clusters visible to the credential.
    async fn list_clusters(
        &self,
        credential: &CredentialPayload,
    ) -> Result<Vec<Cluster>, ProviderError>;

    /// Delete a cluster.
    async fn delete_cluster(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
    ) -> Result<(), ProviderError>;

    /// Create a node pool in a cluster.
    async fn create_node_pool(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
        spec: &NodePoolSpec,
    ) -> Result<NodePool, ProviderError>;

    /// List the node pools of a cluster.
    async fn list_node_pools(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
    ) -> Result<Vec<NodePool>, ProviderError>;

    /// Change the desired size of a node pool.
    async fn scale_node_pool(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
        pool_id: &str,
        desired_size: u32,
    ) -> Result<NodePool, ProviderError>;

    /// Delete a node pool.
    async fn delete_node_pool(
        &self,
        credential: &CredentialPayload,
        cluster_id: &str,
        pool_id: &str,
    ) -> Result<(), ProviderError>;
}
