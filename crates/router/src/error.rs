//! The platform-wide dispatch error taxonomy.

use strato_core::{Capability, CredentialId, ProviderKey};

/// Why a dispatch failed, normalized across every backend.
///
/// Domain services and API layers branch on [`code`](Self::code), which is
/// part of the platform's public contract and never changes meaning between
/// releases. Variants up to and including `CredentialMismatch` are pre-flight
/// failures: no backend was contacted and provider health is unaffected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// No provider with this key is registered.
    #[error("provider '{provider}' is not registered")]
    ProviderNotFound {
        /// The requested provider.
        provider: ProviderKey,
    },

    /// The provider failed validation and is parked.
    #[error("provider '{provider}' is incompatible: {reason}")]
    ProviderIncompatible {
        /// The offending provider.
        provider: ProviderKey,
        /// What validation rejected.
        reason: String,
    },

    /// The provider's initialization failed during activation.
    #[error("provider '{provider}' failed to initialize: {reason}")]
    ProviderInitFailed {
        /// The offending provider.
        provider: ProviderKey,
        /// The retained initialization failure.
        reason: String,
    },

    /// The provider is quarantined pending a successful health probe.
    #[error("provider '{provider}' is unhealthy")]
    ProviderUnhealthy {
        /// The quarantined provider.
        provider: ProviderKey,
    },

    /// The operation's capability is not declared for this provider.
    #[error("provider '{provider}' does not support capability '{capability}'")]
    CapabilityUnsupported {
        /// The targeted provider.
        provider: ProviderKey,
        /// The unsupported capability.
        capability: Capability,
    },

    /// The credential is missing, malformed, or failed schema validation.
    #[error("credential '{credential_id}' is invalid: {reason}")]
    CredentialInvalid {
        /// The offending credential.
        credential_id: CredentialId,
        /// What the vault rejected.
        reason: String,
    },

    /// The credential is bound to a different provider than the request
    /// targets.
    #[error("credential '{credential_id}' is bound to '{bound}', request targets '{requested}'")]
    CredentialMismatch {
        /// The offending credential.
        credential_id: CredentialId,
        /// The provider the credential is bound to.
        bound: ProviderKey,
        /// The provider the request targets.
        requested: ProviderKey,
    },

    /// The backend call exceeded the request deadline plus grace.
    #[error("operation '{operation}' on provider '{provider}' timed out")]
    Timeout {
        /// The dispatched provider.
        provider: ProviderKey,
        /// The stable operation name.
        operation: &'static str,
    },

    /// The backend rejected the credential.
    #[error("provider '{provider}' authentication failed: {message}")]
    AuthError {
        /// The dispatched provider.
        provider: ProviderKey,
        /// Backend detail.
        message: String,
    },

    /// A vendor-side quota or rate limit was exceeded.
    #[error("provider '{provider}' quota exceeded: {message}")]
    QuotaExceeded {
        /// The dispatched provider.
        provider: ProviderKey,
        /// Backend detail.
        message: String,
    },

    /// Any other backend or runtime failure.
    #[error("provider '{provider}' internal error: {message}")]
    Internal {
        /// The dispatched provider.
        provider: ProviderKey,
        /// Categorized detail.
        message: String,
    },
}

impl DispatchError {
    /// The stable error code for this failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProviderNotFound { .. } => "PROVIDER_NOT_FOUND",
            Self::ProviderIncompatible { .. } => "PROVIDER_INCOMPATIBLE",
            Self::ProviderInitFailed { .. } => "PROVIDER_INIT_FAILED",
            Self::ProviderUnhealthy { .. } => "PROVIDER_UNHEALTHY",
            Self::CapabilityUnsupported { .. } => "CAPABILITY_UNSUPPORTED",
            Self::CredentialInvalid { .. } => "CREDENTIAL_INVALID",
            Self::CredentialMismatch { .. } => "CREDENTIAL_MISMATCH",
            Self::Timeout { .. } => "PROVIDER_TIMEOUT",
            Self::AuthError { .. } => "PROVIDER_AUTH_ERROR",
            Self::QuotaExceeded { .. } => "PROVIDER_QUOTA_EXCEEDED",
            Self::Internal { .. } => "PROVIDER_INTERNAL_ERROR",
        }
    }

    /// Whether this failure happened before any backend was contacted.
    /// Pre-flight failures never count against a provider's health.
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::ProviderNotFound { .. }
                | Self::ProviderIncompatible { .. }
                | Self::ProviderInitFailed { .. }
                | Self::ProviderUnhealthy { .. }
                | Self::CapabilityUnsupported { .. }
                | Self::CredentialInvalid { .. }
                | Self::CredentialMismatch { .. }
        )
    }
}
