//! # Strato Contract
//!
//! The Provider Contract: everything a cloud backend must implement to be
//! hosted by the Strato runtime.
//!
//! A **provider** is the packaging unit for one cloud vendor ("aws", "gcp",
//! "azure", an on-prem OpenStack, …). Each provider exposes:
//!
//! - [`ProviderMetadata`] — identity: key, display name, version, declared
//!   capabilities
//! - [`Provider`] — the base trait with an initialization entry point, a
//!   health probe, and accessors for the optional capability interfaces
//! - capability traits — [`ComputeProvider`], [`NetworkProvider`],
//!   [`IamProvider`], [`ClusterProvider`], [`CostEstimator`]
//!
//! Every operation takes a decrypted [`CredentialPayload`] plus a typed
//! request object and returns a normalized result or a typed
//! [`ProviderError`]. Contract compliance is structural: a backend declares
//! which capabilities it implements and the router only dispatches those.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cluster;
mod compute;
mod config;
mod cost;
mod credential;
mod error;
mod iam;
mod metadata;
mod network;
mod operation;
mod provider;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use cluster::{
    Cluster, ClusterProvider, ClusterSpec, ClusterState, NodePool, NodePoolSpec, NodePoolState,
};
pub use compute::{ComputeProvider, Instance, InstanceSpec, InstanceState};
pub use config::ProviderConfig;
pub use cost::{CostEstimate, CostEstimator, CostQuery};
pub use credential::{CredentialPayload, PayloadError, SecretString};
pub use error::ProviderError;
pub use iam::{IamProvider, Role, RoleSpec};
pub use metadata::{MetadataError, ProviderMetadata, ProviderMetadataBuilder};
pub use network::{
    KeyPair, KeyPairSpec, Listener, LoadBalancer, LoadBalancerSpec, LoadBalancerState,
    NetworkProvider, RuleDirection, SecurityGroup, SecurityGroupRule, SecurityGroupSpec, Subnet,
    SubnetSpec, Vpc, VpcSpec,
};
pub use operation::{
    ClusterRequest, ComputeRequest, CostRequest, IamRequest, NetworkRequest, OperationOutcome,
    OperationRequest,
};
pub use provider::Provider;

// Re-export the core primitives contract users always need.
pub use strato_core::{Capability, CapabilitySet, ProviderKey};
