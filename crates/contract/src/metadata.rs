//! Provider identity metadata and builder.

use semver::Version;
use serde::{Deserialize, Serialize};
use strato_core::{Capability, CapabilitySet, ProviderKey, ProviderKeyError};

/// Errors from constructing [`ProviderMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// The provider key failed normalization.
    #[error("invalid provider key: {0}")]
    InvalidKey(#[from] ProviderKeyError),

    /// No capability was declared; a provider must implement at least one.
    #[error("provider '{0}' declares no capabilities")]
    NoCapabilities(String),
}

/// Static identity of a backend implementation.
///
/// The unique key, a human-readable name, the implementation version, and
/// the set of capability interfaces the backend actually implements.
///
/// ```
/// use semver::Version;
/// use strato_contract::{Capability, ProviderMetadata};
///
/// let meta = ProviderMetadata::builder("aws", Version::new(2, 1, 0))
///     .display_name("Amazon Web Services")
///     .capability(Capability::Compute)
///     .capability(Capability::Network)
///     .build()
///     .unwrap();
///
/// assert_eq!(meta.key().as_str(), "aws");
/// assert!(meta.capabilities().contains(Capability::Network));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    key: ProviderKey,
    display_name: String,
    version: Version,
    capabilities: CapabilitySet,
    #[serde(default)]
    description: String,
}

impl ProviderMetadata {
    /// Start building metadata from the minimum identity fields.
    pub fn builder(key: impl AsRef<str>, version: Version) -> ProviderMetadataBuilder {
        ProviderMetadataBuilder {
            key: key.as_ref().to_owned(),
            display_name: None,
            version,
            capabilities: CapabilitySet::empty(),
            description: String::new(),
        }
    }

    /// The normalized unique key ("aws", "gcp", …).
    #[inline]
    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    /// Human-readable name for UIs and logs.
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Implementation version, matched against the host's constraint.
    #[inline]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The capability interfaces this backend implements.
    #[inline]
    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Short description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`ProviderMetadata`].
#[derive(Debug, Clone)]
pub struct ProviderMetadataBuilder {
    key: String,
    display_name: Option<String>,
    version: Version,
    capabilities: CapabilitySet,
    description: String,
}

impl ProviderMetadataBuilder {
    /// Set the human-readable name (defaults to the key).
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Declare one implemented capability.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Declare a whole capability set at once.
    #[must_use]
    pub fn capabilities(mut self, set: CapabilitySet) -> Self {
        self.capabilities = set;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Fails if the key does not normalize or no capability was declared.
    pub fn build(self) -> Result<ProviderMetadata, MetadataError> {
        let key = ProviderKey::new(&self.key)?;
        if self.capabilities.is_empty() {
            return Err(MetadataError::NoCapabilities(key.to_string()));
        }
        let display_name = self.display_name.unwrap_or_else(|| key.to_string());
        Ok(ProviderMetadata {
            key,
            display_name,
            version: self.version,
            capabilities: self.capabilities,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builder_normalizes_key_and_defaults_name() {
        let meta = ProviderMetadata::builder("Open Stack", Version::new(0, 3, 1))
            .capability(Capability::Compute)
            .build()
            .unwrap();

        assert_eq!(meta.key().as_str(), "open_stack");
        assert_eq!(meta.display_name(), "open_stack");
        assert_eq!(meta.version(), &Version::new(0, 3, 1));
    }

    #[test]
    fn builder_rejects_empty_capability_set() {
        let err = ProviderMetadata::builder("aws", Version::new(1, 0, 0))
            .build()
            .unwrap_err();
        assert_eq!(err, MetadataError::NoCapabilities("aws".into()));
    }

    #[test]
    fn builder_rejects_invalid_key() {
        let err = ProviderMetadata::builder("!!", Version::new(1, 0, 0))
            .capability(Capability::Compute)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidKey(_)));
    }
}
