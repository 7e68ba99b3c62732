//! # Strato Router
//!
//! Request router and dispatcher for the Strato provider runtime.
//!
//! A domain service builds a [`RoutingRequest`] naming a workspace, a
//! provider, a credential and one typed operation; [`Dispatcher::dispatch`]
//! runs the pipeline — registry lookup, capability check, credential
//! resolution, bounded backend invocation, outcome normalization — and
//! emits exactly one [`AuditRecord`] per dispatch.
//!
//! ## Key Components
//!
//! - [`RoutingRequest`] — the ephemeral request envelope with its deadline
//! - [`DispatchError`] — the platform error taxonomy with stable codes
//! - [`Dispatcher`], [`DispatcherConfig`] — the pipeline and its policy
//!   knobs
//! - [`AuditSink`], [`TracingAuditSink`] — fire-and-forget audit emission

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod dispatcher;
mod error;
mod request;

pub use audit::{AuditRecord, AuditSink, TracingAuditSink};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::DispatchError;
pub use request::{DEFAULT_DEADLINE, RequestBuildError, RoutingRequest, RoutingRequestBuilder};
