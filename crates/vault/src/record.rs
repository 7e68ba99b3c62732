//! The persisted credential record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strato_core::{CredentialId, ProviderKey, WorkspaceId};

use crate::EncryptedData;

/// A stored credential: tenant scope, target provider, ciphertext.
///
/// Only the encrypted envelope is ever persisted; the decrypted value exists
/// solely as a local value inside one dispatch call's memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier.
    pub id: CredentialId,
    /// Owning tenant workspace.
    pub workspace_id: WorkspaceId,
    /// The provider this credential authenticates against. Dispatch fails
    /// closed when this differs from the request's target provider.
    pub provider: ProviderKey,
    /// The encrypted payload.
    pub data: EncryptedData,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Build a fresh record with a random id and current timestamps.
    #[must_use]
    pub fn new(workspace_id: WorkspaceId, provider: ProviderKey, data: EncryptedData) -> Self {
        let now = Utc::now();
        Self {
            id: CredentialId::v4(),
            workspace_id,
            provider,
            data,
            created_at: now,
            updated_at: now,
        }
    }
}
