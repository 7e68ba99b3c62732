//! Backend error taxonomy.

/// A typed failure reported by a backend implementation.
///
/// Backends map their vendor SDK errors into these categories; the router
/// normalizes them further into the platform-wide dispatch taxonomy. A raw
/// fault (panic, connection reset) must never cross the contract boundary —
/// backends convert everything into one of these variants.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The supplied credential was rejected by the cloud backend.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A vendor-side quota or rate limit was exceeded.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The referenced cloud resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The request was structurally valid but semantically rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backend endpoint could not be reached or is temporarily down.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Anything else: the backend failed in an unclassified way.
    #[error("backend internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Whether a caller may reasonably retry the same call.
    ///
    /// Only transient transport-level failures are retryable; auth, quota
    /// and validation failures will fail again until the request changes.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Short stable category name for logging and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::NotFound(_) => "not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }
}
