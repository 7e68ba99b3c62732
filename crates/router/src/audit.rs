//! Fire-and-forget audit emission.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strato_core::{Capability, CredentialId, ProviderKey, WorkspaceId};
use tracing::info;

/// One dispatch, summarized for the platform's audit pipeline.
///
/// Carries identifiers and outcome only. Credential payloads, request
/// bodies and backend responses never appear here.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// The requesting workspace.
    pub workspace_id: WorkspaceId,
    /// The dispatched provider.
    pub provider: ProviderKey,
    /// The operation's capability.
    pub capability: Capability,
    /// Stable operation name.
    pub operation: &'static str,
    /// The credential the dispatch authenticated with (id only).
    pub credential_id: CredentialId,
    /// Whether the dispatch succeeded.
    pub success: bool,
    /// Stable error code on failure.
    pub error_code: Option<&'static str>,
    /// Wall time from router entry to outcome.
    pub duration: Duration,
    /// When the dispatch completed.
    pub occurred_at: DateTime<Utc>,
}

/// Destination for audit records.
///
/// Emission is fire-and-forget: the router never fails a dispatch because
/// auditing did, so `record` is infallible from the router's perspective.
/// Implementations that buffer or ship records handle their own errors.
pub trait AuditSink: Send + Sync {
    /// Accept one record.
    fn record(&self, record: AuditRecord);
}

/// Emits audit records as structured `tracing` events under the
/// `strato::audit` target. The default sink for hosts without a dedicated
/// audit pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        info!(
            target: "strato::audit",
            workspace_id = %record.workspace_id,
            provider = %record.provider,
            capability = %record.capability,
            operation = record.operation,
            credential_id = %record.credential_id,
            success = record.success,
            error_code = record.error_code.unwrap_or("-"),
            duration_ms = u64::try_from(record.duration.as_millis()).unwrap_or(u64::MAX),
            "dispatch"
        );
    }
}
