//! Provider lifecycle state and descriptor.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use strato_core::{CapabilitySet, ProviderKey};

use crate::ProviderLocation;

/// Lifecycle state of a registered provider.
///
/// ```text
/// Discovered ─→ Validated ─→ Activated ─→ Healthy ⇄ Degraded
///                                             │         │
///                                             └──→ Unloaded ←──┘
/// ```
///
/// `Healthy → Degraded` is driven by the failure counter, `Degraded →
/// Healthy` only by a successful probe. A reload re-enters `Activated` from
/// either serving state. Only the loader and the health monitor mutate the
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Present in configuration, not yet validated.
    Discovered,
    /// Metadata checked against the declared capabilities and version
    /// constraint.
    Validated,
    /// `initialize` is being (or has been) called.
    Activated,
    /// Serving dispatches.
    Healthy,
    /// Quarantined: loaded but not dispatched to, pending a probe. Also the
    /// parking state for a failed `initialize`.
    Degraded,
    /// Removed from service.
    Unloaded,
}

impl ProviderStatus {
    /// Whether the state machine permits moving to `next`.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Validated | Self::Unloaded)
                | (Self::Validated, Self::Activated)
                | (Self::Activated, Self::Healthy | Self::Degraded)
                | (Self::Healthy, Self::Degraded | Self::Activated | Self::Unloaded)
                | (Self::Degraded, Self::Healthy | Self::Activated | Self::Unloaded)
                | (Self::Unloaded, Self::Discovered)
        )
    }

    /// Stable lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Validated => "validated",
            Self::Activated => "activated",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unloaded => "unloaded",
        }
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry-side view of one provider: configuration plus lifecycle state.
///
/// The declared capability set and version constraint come from the host's
/// configuration; `resolved_version` and `last_error` are filled in by the
/// loader as activation progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    key: ProviderKey,
    capabilities: CapabilitySet,
    location: ProviderLocation,
    version_req: VersionReq,
    resolved_version: Option<Version>,
    status: ProviderStatus,
    last_error: Option<String>,
}

impl ProviderDescriptor {
    /// Build a freshly discovered descriptor from configuration.
    #[must_use]
    pub fn discovered(
        key: ProviderKey,
        capabilities: CapabilitySet,
        location: ProviderLocation,
        version_req: VersionReq,
    ) -> Self {
        Self {
            key,
            capabilities,
            location,
            version_req,
            resolved_version: None,
            status: ProviderStatus::Discovered,
            last_error: None,
        }
    }

    /// The provider key.
    #[inline]
    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    /// Capabilities the host declared for this provider. Dispatches outside
    /// this set are rejected without consulting the implementation.
    #[inline]
    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Where the implementation lives.
    #[inline]
    pub fn location(&self) -> &ProviderLocation {
        &self.location
    }

    /// The host's version constraint.
    #[inline]
    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    /// The implementation version reported at validation, if reached.
    #[inline]
    pub fn resolved_version(&self) -> Option<&Version> {
        self.resolved_version.as_ref()
    }

    /// Current lifecycle state.
    #[inline]
    pub fn status(&self) -> ProviderStatus {
        self.status
    }

    /// Diagnostics from the last failed validation or activation.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Move to `next` if the state machine allows it. Returns whether the
    /// transition was applied.
    pub(crate) fn transition(&mut self, next: ProviderStatus) -> bool {
        if self.status.can_transition(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_resolved_version(&mut self, version: Version) {
        self.resolved_version = Some(version);
    }

    pub(crate) fn set_last_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    pub(crate) fn clear_last_error(&mut self) {
        self.last_error = None;
    }
}
