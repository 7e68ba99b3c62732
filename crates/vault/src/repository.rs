//! Persistence seam for encrypted credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use strato_core::{CredentialId, WorkspaceId};

use crate::Credential;

/// Error from a credential repository backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("credential repository error: {0}")]
pub struct RepositoryError(pub String);

/// Storage for encrypted credential records.
///
/// Implemented by the platform's persistence layer (a database-backed store
/// in production). The vault only ever reads and writes ciphertext through
/// this trait. Lookups are keyed by `(workspace, id)` so one tenant can
/// never address another tenant's credential.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Fetch a credential by id within a workspace.
    async fn get(
        &self,
        workspace_id: WorkspaceId,
        credential_id: CredentialId,
    ) -> Result<Option<Credential>, RepositoryError>;

    /// Insert or replace a credential record.
    async fn put(&self, credential: Credential) -> Result<(), RepositoryError>;

    /// Delete a credential. Returns whether a record existed.
    async fn delete(
        &self,
        workspace_id: WorkspaceId,
        credential_id: CredentialId,
    ) -> Result<bool, RepositoryError>;

    /// List all credentials of a workspace.
    async fn list(&self, workspace_id: WorkspaceId) -> Result<Vec<Credential>, RepositoryError>;
}

/// In-memory repository for tests and single-node embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialRepository {
    entries: RwLock<HashMap<(WorkspaceId, CredentialId), Credential>>,
}

impl MemoryCredentialRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, across all workspaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn get(
        &self,
        workspace_id: WorkspaceId,
        credential_id: CredentialId,
    ) -> Result<Option<Credential>, RepositoryError> {
        Ok(self.entries.read().get(&(workspace_id, credential_id)).cloned())
    }

    async fn put(&self, credential: Credential) -> Result<(), RepositoryError> {
        self.entries
            .write()
            .insert((credential.workspace_id, credential.id), credential);
        Ok(())
    }

    async fn delete(
        &self,
        workspace_id: WorkspaceId,
        credential_id: CredentialId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .entries
            .write()
            .remove(&(workspace_id, credential_id))
            .is_some())
    }

    async fn list(&self, workspace_id: WorkspaceId) -> Result<Vec<Credential>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect())
    }
}
