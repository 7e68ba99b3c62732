//! Declarative registry configuration.

use std::time::Duration;

use semver::VersionReq;
use serde::{Deserialize, Serialize};
use strato_contract::ProviderConfig;
use strato_core::CapabilitySet;

/// Where a provider implementation lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderLocation {
    /// Constructed in-process by the host's [`ProviderFactory`].
    ///
    /// [`ProviderFactory`]: crate::ProviderFactory
    #[default]
    InProcess,
    /// Served by a separate process reachable at `endpoint`. Carried in
    /// configuration so a host can register a remote-capable factory; the
    /// built-in factories reject it as incompatible.
    Remote {
        /// Transport endpoint of the remote plugin host.
        endpoint: String,
    },
}

/// One provider entry in the host's declarative provider list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Provider name; normalized into a key at apply time.
    pub name: String,

    /// Where the implementation lives.
    #[serde(default)]
    pub location: ProviderLocation,

    /// Capabilities the host wants routed to this provider. Must be a
    /// subset of what the implementation's metadata declares.
    pub capabilities: CapabilitySet,

    /// Version constraint the implementation must satisfy.
    #[serde(default = "VersionReq::default")]
    pub version: VersionReq,

    /// Free-form settings handed to `initialize`.
    #[serde(default)]
    pub config: ProviderConfig,

    /// Activate eagerly at apply time instead of on first dispatch.
    #[serde(default)]
    pub preload: bool,
}

impl ProviderSpec {
    /// A minimal in-process spec: any version, lazy activation.
    #[must_use]
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            location: ProviderLocation::InProcess,
            capabilities,
            version: VersionReq::STAR,
            config: ProviderConfig::new(),
            preload: false,
        }
    }
}

/// Health-monitoring and dispatch-bounding knobs, shared by all providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive dispatch failures before a provider is quarantined.
    pub failure_threshold: u32,

    /// How often the background loop probes quarantined providers.
    #[serde(with = "humantime_serde")]
    pub probe_interval: Duration,

    /// Upper bound on one health probe call.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    /// Per-provider cap on concurrently executing dispatches.
    pub max_concurrent_dispatches: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            probe_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            max_concurrent_dispatches: 32,
        }
    }
}

/// The full registry configuration: provider list plus health policy.
///
/// `ProviderRegistry::apply` takes this whole document, so a host can
/// re-read its config file and converge the registry without restarting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The declarative provider list.
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,

    /// Health policy.
    #[serde(default)]
    pub health: HealthConfig,
}
