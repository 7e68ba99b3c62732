//! Provider capabilities and capability sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named group of related operations a backend may optionally support.
///
/// A provider declares its capabilities at registration; the router checks
/// the declared set before dispatch so a missing capability fails fast
/// instead of reaching the backend.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Virtual machine lifecycle (create, start, stop, delete, status).
    Compute,
    /// VPCs, subnets, security groups, key pairs, load balancers.
    Network,
    /// Roles and policy attachments.
    Iam,
    /// Managed container clusters and node pools.
    Cluster,
    /// Price estimation for planned resources.
    CostEstimate,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Compute,
        Self::Network,
        Self::Iam,
        Self::Cluster,
        Self::CostEstimate,
    ];

    /// Stable snake_case name, used in config files and audit records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Network => "network",
            Self::Iam => "iam",
            Self::Cluster => "cluster",
            Self::CostEstimate => "cost_estimate",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Compute => 1 << 0,
            Self::Network => 1 << 1,
            Self::Iam => 1 << 2,
            Self::Cluster => 1 << 3,
            Self::CostEstimate => 1 << 4,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error from parsing an unknown capability name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compute" => Ok(Self::Compute),
            "network" => Ok(Self::Network),
            "iam" => Ok(Self::Iam),
            "cluster" => Ok(Self::Cluster),
            "cost_estimate" => Ok(Self::CostEstimate),
            other => Err(UnknownCapability(other.to_owned())),
        }
    }
}

/// A bitset of [`Capability`] values.
///
/// # Examples
///
/// ```
/// use strato_core::{Capability, CapabilitySet};
///
/// let set = CapabilitySet::empty()
///     .with(Capability::Compute)
///     .with(Capability::Network);
///
/// assert!(set.contains(Capability::Compute));
/// assert!(!set.contains(Capability::Cluster));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The set containing every capability.
    #[must_use]
    pub const fn all() -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < Capability::ALL.len() {
            bits |= Capability::ALL[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Return a copy with `capability` added (builder form).
    #[must_use]
    pub const fn with(mut self, capability: Capability) -> Self {
        self.0 |= capability.bit();
        self
    }

    /// Add a capability in place.
    pub const fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    /// Whether `capability` is in the set.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Whether every capability in `other` is also in `self`.
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of capabilities in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the capabilities in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(capabilities: Vec<Capability>) -> Self {
        capabilities.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for CapabilitySet {
    /// Renders as `{compute, network}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, capability) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{capability}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = CapabilitySet::empty();
        assert!(set.is_empty());

        set.insert(Capability::Compute);
        set.insert(Capability::Cluster);

        assert!(set.contains(Capability::Compute));
        assert!(set.contains(Capability::Cluster));
        assert!(!set.contains(Capability::Network));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn all_contains_everything() {
        let all = CapabilitySet::all();
        for capability in Capability::ALL {
            assert!(all.contains(capability));
        }
        assert_eq!(all.len(), Capability::ALL.len());
    }

    #[test]
    fn contains_all_is_subset_check() {
        let declared = CapabilitySet::empty()
            .with(Capability::Compute)
            .with(Capability::Network);
        let needed = CapabilitySet::empty().with(Capability::Compute);

        assert!(declared.contains_all(needed));
        assert!(!needed.contains_all(declared));
    }

    #[test]
    fn serde_as_name_list() {
        let set = CapabilitySet::empty()
            .with(Capability::Compute)
            .with(Capability::CostEstimate);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[\"compute\",\"cost_estimate\"]");

        let back: CapabilitySet = serde_json::from_str("[\"network\",\"iam\"]").unwrap();
        assert!(back.contains(Capability::Network));
        assert!(back.contains(Capability::Iam));
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn display_lists_names() {
        let set = CapabilitySet::empty()
            .with(Capability::Compute)
            .with(Capability::Network);
        assert_eq!(set.to_string(), "{compute, network}");
    }
}
