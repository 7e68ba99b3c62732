//! IAM capability: roles and policy attachments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CredentialPayload, ProviderError};

/// Request to create a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Role name, unique per account.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Vendor-specific trust / assume-role document, passed through opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_policy: Option<Value>,
}

/// A role as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Vendor resource identifier.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Identifiers of attached policies.
    #[serde(default)]
    pub attached_policies: Vec<String>,
    /// Creation timestamp, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Identity and access management operations.
#[async_trait]
pub trait IamProvider: Send + Sync {
    /// Create a role.
    async fn create_role(
        &self,
        credential: &CredentialPayload,
        spec: &RoleSpec,
    ) -> Result<Role, ProviderError>;

    /// Fetch a role by name.
    async fn get_role(
        &self,
        credential: &CredentialPayload,
        name: &str,
    ) -> Result<Role, ProviderError>;

    /// List roles visible to the credential.
    async fn list_roles(&self, credential: &CredentialPayload) -> Result<Vec<Role>, ProviderError>;

    /// Delete a role.
    async fn delete_role(
        &self,
        credential: &CredentialPayload,
        name: &str,
    ) -> Result<(), ProviderError>;

    /// Attach a managed policy to a role.
    async fn attach_policy(
        &self,
        credential: &CredentialPayload,
        role_name: &str,
        policy_id: &str,
    ) -> Result<Role, ProviderError>;

    /// Detach a managed policy from a role.
    async fn detach_policy(
        &self,
        credential: &CredentialPayload,
        role_name: &str,
        policy_id: &str,
    ) -> Result<Role, ProviderError>;
}
