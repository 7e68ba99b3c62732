//! Compute capability: virtual machine lifecycle.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CredentialPayload, ProviderError};

/// Request to create a virtual machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Display name of the instance.
    pub name: String,
    /// Vendor machine type / flavor ("t3.micro", "e2-small", …).
    pub machine_type: String,
    /// Vendor image identifier to boot from.
    pub image: String,
    /// Region or zone to place the instance in.
    pub region: String,
    /// Subnet to attach the primary interface to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// Security groups for the primary interface.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    /// Key pair name for SSH access, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pair: Option<String>,
    /// Free-form tags propagated to the cloud resource.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Lifecycle state of a virtual machine, normalized across vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Requested but not yet running.
    Pending,
    /// Up and serving.
    Running,
    /// Stop requested, still shutting down.
    Stopping,
    /// Halted but not deleted.
    Stopped,
    /// Deleted or being deleted.
    Terminated,
    /// The vendor reported a state we do not model.
    Unknown,
}

/// A virtual machine as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Vendor resource identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalized lifecycle state.
    pub state: InstanceState,
    /// Machine type / flavor.
    pub machine_type: String,
    /// Region or zone.
    pub region: String,
    /// Primary private IP, once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    /// Public IP, if one is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    /// Launch timestamp, if the vendor reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<DateTime<Utc>>,
    /// Tags on the resource.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Virtual machine operations.
///
/// Every method receives the decrypted credential for the tenant making the
/// call; implementations must not cache it beyond the call.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Create a new instance.
    async fn create_instance(
        &self,
        credential: &CredentialPayload,
        spec: &InstanceSpec,
    ) -> Result<Instance, ProviderError>;

    /// Fetch a single instance by vendor id.
    async fn get_instance(
        &self,
        credential: &CredentialPayload,
        instance_id: &str,
    ) -> Result<Instance, ProviderError>;

    /// Delete (terminate) an instance.
    async fn delete_instance(
        &self,
        credential: &CredentialPayload,
        instance_id: &str,
    ) -> Result<(), ProviderError>;

    /// Start a stopped instance.
    async fn start_instance(
        &self,
        credential: &CredentialPayload,
        instance_id: &str,
    ) -> Result<Instance, ProviderError>;

    /// Stop a running instance.
    async fn stop_instance(
        &self,
        credential: &CredentialPayload,
        instance_id: &str,
    ) -> Result<Instance, ProviderError>;

    /// Cheap state-only lookup.
    async fn instance_status(
        &self,
        credential: &CredentialPayload,
        instance_id: &str,
    ) -> Result<InstanceState, ProviderError>;
}
