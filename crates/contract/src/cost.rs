//! Cost-estimate capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CredentialPayload, ProviderError};

/// A planned resource to price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostQuery {
    /// Kind of resource being priced ("instance", "cluster", …).
    pub resource_kind: String,
    /// The would-be resource spec, passed through opaque to the backend.
    pub spec: Value,
    /// Region pricing applies to.
    pub region: String,
}

/// A price estimate for a planned resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated hourly cost.
    pub hourly: f64,
    /// Estimated monthly cost (vendor's own month convention).
    pub monthly: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Caveats the backend wants surfaced ("excludes egress", …).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Price estimation for planned resources.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    /// Estimate the cost of a planned resource.
    async fn estimate(
        &self,
        credential: &CredentialPayload,
        query: &CostQuery,
    ) -> Result<CostEstimate, ProviderError>;
}
