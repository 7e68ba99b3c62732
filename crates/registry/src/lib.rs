//! # Strato Registry
//!
//! Plugin registry, loader and health monitor for the Strato provider
//! runtime.
//!
//! Providers are declared in a [`RegistryConfig`], constructed through a
//! host-injected [`ProviderFactory`], validated against their declared
//! capabilities and version constraint, and activated lazily on first
//! dispatch (or eagerly via `preload`). Activation for one name is
//! serialized; lookups on the dispatch path are lock-free.
//!
//! ## Key Components
//!
//! - [`ProviderDescriptor`], [`ProviderStatus`] — lifecycle state machine
//! - [`RegistryConfig`], [`ProviderSpec`], [`HealthConfig`] — declarative
//!   configuration
//! - [`ProviderFactory`], [`InProcessFactory`] — construction seam
//! - [`PluginInstance`] — a live provider with its dispatch limiter and
//!   failure counter
//! - [`ProviderRegistry`] — `ensure_loaded` / `resolve` / `reload` /
//!   `unload` / `apply`
//! - [`HealthMonitor`] — background probing of quarantined providers

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod descriptor;
mod error;
mod factory;
mod health;
mod instance;
mod registry;

pub use config::{HealthConfig, ProviderLocation, ProviderSpec, RegistryConfig};
pub use descriptor::{ProviderDescriptor, ProviderStatus};
pub use error::RegistryError;
pub use factory::{FactoryError, InProcessFactory, ProviderConstructor, ProviderFactory};
pub use health::HealthMonitor;
pub use instance::PluginInstance;
pub use registry::ProviderRegistry;
