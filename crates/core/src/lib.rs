//! # Strato Core
//!
//! Shared primitives for the Strato provider runtime. Every other Strato
//! crate builds on the types defined here.
//!
//! ## Key Components
//!
//! - [`ProviderKey`] — normalized, validated identifier for a cloud backend
//! - [`WorkspaceId`], [`CredentialId`] — UUID-backed tenant-scoped identifiers
//! - [`Capability`], [`CapabilitySet`] — the optional interface groups a
//!   backend may implement, checked before dispatch

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod id;
mod keys;

pub use capability::{Capability, CapabilitySet, UnknownCapability};
pub use id::{CredentialId, WorkspaceId};
pub use keys::{ProviderKey, ProviderKeyError};
