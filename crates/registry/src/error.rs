//! Registry error taxonomy.

use strato_core::{ProviderKey, ProviderKeyError};

/// Errors from registry lookups and lifecycle operations.
///
/// Each variant corresponds to one way a dispatch can fail before any
/// backend is contacted; the router maps them onto the platform's stable
/// error codes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// No provider with this key is registered.
    #[error("provider '{key}' is not registered")]
    NotFound {
        /// The requested provider.
        key: ProviderKey,
    },

    /// The provider failed validation: undeclared capabilities, a version
    /// outside the host's constraint, or an unservable location. The
    /// descriptor is parked until the configuration changes.
    #[error("provider '{key}' failed validation: {reason}")]
    Incompatible {
        /// The offending provider.
        key: ProviderKey,
        /// What validation rejected.
        reason: String,
    },

    /// The provider's `initialize` returned an error during activation.
    #[error("provider '{key}' failed to initialize: {reason}")]
    InitFailed {
        /// The offending provider.
        key: ProviderKey,
        /// The initialization failure, retained from activation.
        reason: String,
    },

    /// The provider is quarantined after repeated dispatch failures and has
    /// not yet passed a health probe.
    #[error("provider '{key}' is quarantined pending a successful health probe")]
    Unhealthy {
        /// The quarantined provider.
        key: ProviderKey,
    },

    /// The provider is registered but activation has not been attempted.
    /// Callers go through `ensure_loaded` first, so seeing this error means
    /// a caller skipped that step.
    #[error("provider '{key}' is registered but not activated")]
    NotActivated {
        /// The unactivated provider.
        key: ProviderKey,
    },

    /// A configured provider name failed key normalization.
    #[error("invalid provider name '{name}': {source}")]
    InvalidKey {
        /// The raw configured name.
        name: String,
        /// The normalization failure.
        #[source]
        source: ProviderKeyError,
    },
}
