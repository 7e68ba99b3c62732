//! The routed request envelope.

use std::time::{Duration, Instant};

use strato_contract::OperationRequest;
use strato_core::{Capability, CredentialId, ProviderKey, WorkspaceId};

/// Deadline applied when the caller does not set one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Error from building a [`RoutingRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("routing request is missing required field '{0}'")]
pub struct RequestBuildError(pub &'static str);

/// One operation addressed to one provider on behalf of one tenant.
///
/// Ephemeral: lives for the duration of a dispatch and is never persisted,
/// which is why the deadline is a monotonic [`Instant`] rather than a wall
/// clock timestamp.
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    /// The requesting tenant workspace.
    pub workspace_id: WorkspaceId,
    /// The target provider.
    pub provider: ProviderKey,
    /// The tenant credential to authenticate with.
    pub credential_id: CredentialId,
    /// What to do.
    pub operation: OperationRequest,
    /// Absolute point after which the caller no longer wants the answer.
    pub deadline: Instant,
}

impl RoutingRequest {
    /// Start building a request.
    #[must_use]
    pub fn builder() -> RoutingRequestBuilder {
        RoutingRequestBuilder::default()
    }

    /// The capability the operation belongs to.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.operation.capability()
    }
}

/// Builder for [`RoutingRequest`].
#[derive(Debug, Default)]
pub struct RoutingRequestBuilder {
    workspace_id: Option<WorkspaceId>,
    provider: Option<ProviderKey>,
    credential_id: Option<CredentialId>,
    operation: Option<OperationRequest>,
    deadline: Option<Instant>,
}

impl RoutingRequestBuilder {
    /// Set the requesting workspace.
    #[must_use]
    pub fn workspace(mut self, workspace_id: WorkspaceId) -> Self {
        self.workspace_id = Some(workspace_id);
        self
    }

    /// Set the target provider.
    #[must_use]
    pub fn provider(mut self, provider: ProviderKey) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the credential to authenticate with.
    #[must_use]
    pub fn credential(mut self, credential_id: CredentialId) -> Self {
        self.credential_id = Some(credential_id);
        self
    }

    /// Set the operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationRequest) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now.
    #[must_use]
    pub fn deadline_in(self, budget: Duration) -> Self {
        self.deadline(Instant::now() + budget)
    }

    /// Assemble the request.
    ///
    /// # Errors
    ///
    /// Fails naming the first missing required field. The deadline defaults
    /// to [`DEFAULT_DEADLINE`] from now.
    pub fn build(self) -> Result<RoutingRequest, RequestBuildError> {
        Ok(RoutingRequest {
            workspace_id: self.workspace_id.ok_or(RequestBuildError("workspace_id"))?,
            provider: self.provider.ok_or(RequestBuildError("provider"))?,
            credential_id: self
                .credential_id
                .ok_or(RequestBuildError("credential_id"))?,
            operation: self.operation.ok_or(RequestBuildError("operation"))?,
            deadline: self
                .deadline
                .unwrap_or_else(|| Instant::now() + DEFAULT_DEADLINE),
        })
    }
}
