//! The dispatch-facing vault API.

use std::sync::Arc;

use strato_contract::{CredentialPayload, PayloadError};
use strato_core::{CredentialId, ProviderKey, WorkspaceId};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    Credential, CredentialRepository, CryptoError, EncryptionKey, RepositoryError, decrypt,
    encrypt,
};

/// Errors from vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// No credential with this id exists in the workspace. Also returned
    /// when the id exists under a different workspace, so the vault is not
    /// an existence oracle across tenants.
    #[error("credential '{credential_id}' not found in workspace '{workspace_id}'")]
    NotFound {
        /// The requesting workspace.
        workspace_id: WorkspaceId,
        /// The requested credential.
        credential_id: CredentialId,
    },

    /// The credential is bound to a different provider than the request
    /// targets. Checked before any decryption is attempted.
    #[error("credential '{credential_id}' is bound to provider '{bound}', request targets '{requested}'")]
    ProviderMismatch {
        /// The requested credential.
        credential_id: CredentialId,
        /// The provider the credential is bound to.
        bound: ProviderKey,
        /// The provider the request targets.
        requested: ProviderKey,
    },

    /// Encryption or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The decrypted payload did not decode into any known family.
    #[error("credential '{credential_id}' payload is malformed")]
    Malformed {
        /// The offending credential.
        credential_id: CredentialId,
    },

    /// The decrypted payload is missing a field its family requires.
    #[error("credential '{credential_id}' failed schema validation: {source}")]
    InvalidPayload {
        /// The offending credential.
        credential_id: CredentialId,
        /// The validation failure.
        #[source]
        source: PayloadError,
    },

    /// The backing repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Encrypts tenant credentials at rest and decrypts them transiently for one
/// dispatch call.
///
/// `resolve` is deliberately a pure function of its inputs with no caching
/// layer — every dispatch re-decrypts, so revoking a credential in the
/// repository takes effect on the next call.
pub struct CredentialVault {
    key: EncryptionKey,
    repository: Arc<dyn CredentialRepository>,
}

impl CredentialVault {
    /// Build a vault over the given process-wide key and repository.
    #[must_use]
    pub fn new(key: EncryptionKey, repository: Arc<dyn CredentialRepository>) -> Self {
        Self { key, repository }
    }

    /// Validate, encrypt and persist a credential payload for a workspace.
    ///
    /// # Errors
    ///
    /// Fails with [`VaultError::InvalidPayload`] before anything is stored
    /// when the payload is missing required fields.
    pub async fn store(
        &self,
        workspace_id: WorkspaceId,
        provider: ProviderKey,
        payload: &CredentialPayload,
    ) -> Result<Credential, VaultError> {
        // Reject incomplete shapes at the boundary, not inside a backend
        // call. No record exists yet, so the error carries the nil id.
        payload.validate().map_err(|source| VaultError::InvalidPayload {
            credential_id: CredentialId::nil(),
            source,
        })?;

        let plaintext = Zeroizing::new(
            serde_json::to_vec(payload).map_err(|_| CryptoError::EncryptionFailed)?,
        );
        let data = encrypt(&self.key, &plaintext)?;
        let credential = Credential::new(workspace_id, provider, data);

        self.repository.put(credential.clone()).await?;
        debug!(
            credential_id = %credential.id,
            workspace_id = %workspace_id,
            provider = %credential.provider,
            family = payload.family(),
            "stored credential"
        );
        Ok(credential)
    }

    /// Fetch, check, decrypt and validate a credential for one dispatch.
    ///
    /// The full pre-flight sequence in one place:
    ///
    /// 1. fetch by `(workspace, id)` — absent (or owned by another tenant)
    ///    fails with [`VaultError::NotFound`];
    /// 2. the stored `provider` must equal the dispatch target, checked
    ///    **before** decryption ([`VaultError::ProviderMismatch`]);
    /// 3. decrypt and deserialize; the plaintext buffer is zeroized on exit;
    /// 4. schema-validate the payload for its family.
    ///
    /// The returned payload's secret fields zero themselves on drop; callers
    /// must drop it when the dispatch call returns.
    pub async fn resolve(
        &self,
        workspace_id: WorkspaceId,
        provider: &ProviderKey,
        credential_id: CredentialId,
    ) -> Result<CredentialPayload, VaultError> {
        let credential = self
            .repository
            .get(workspace_id, credential_id)
            .await?
            .ok_or(VaultError::NotFound {
                workspace_id,
                credential_id,
            })?;

        if credential.provider != *provider {
            warn!(
                credential_id = %credential_id,
                bound = %credential.provider,
                requested = %provider,
                "credential bound to different provider, failing closed"
            );
            return Err(VaultError::ProviderMismatch {
                credential_id,
                bound: credential.provider,
                requested: provider.clone(),
            });
        }

        let plaintext = decrypt(&self.key, &credential.data)?;
        let payload: CredentialPayload = serde_json::from_slice(&plaintext)
            .map_err(|_| VaultError::Malformed { credential_id })?;

        payload
            .validate()
            .map_err(|source| VaultError::InvalidPayload {
                credential_id,
                source,
            })?;

        debug!(
            credential_id = %credential_id,
            family = payload.family(),
            "decrypted credential for dispatch"
        );
        Ok(payload)
    }

    /// Delete a credential. Returns whether a record existed.
    pub async fn delete(
        &self,
        workspace_id: WorkspaceId,
        credential_id: CredentialId,
    ) -> Result<bool, VaultError> {
        Ok(self.repository.delete(workspace_id, credential_id).await?)
    }

    /// List a workspace's credential records (ciphertext only).
    pub async fn list(&self, workspace_id: WorkspaceId) -> Result<Vec<Credential>, VaultError> {
        Ok(self.repository.list(workspace_id).await?)
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault").finish_non_exhaustive()
    }
}
