pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    DetailedOptimization, ExampleCatalog, HealthStatus, OptimizationSummary, ValidatedRequest,
};

pub use http::HttpOptimizer;

pub const OPTIMIZE_PATH: &str = "/optimize";
pub const OPTIMIZE_DETAILED_PATH: &str = "/optimize/detailed";
pub const EXAMPLES_PATH: &str = "/examples";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No response at all: refused connection, DNS failure, timeout.
    #[error("optimization service unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
    /// Non-success status. `detail` is the server's message or a synthesized one.
    #[error("{detail}")]
    Service { status: u16, detail: String },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("failed to set up HTTP client: {0}")]
    Setup(String),
}

impl DispatchError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// The remote optimizer as seen by the client.
#[async_trait]
pub trait OptimizationService: Send + Sync {
    async fn optimize_detailed(
        &self,
        request: &ValidatedRequest,
    ) -> Result<DetailedOptimization, DispatchError>;
    async fn optimize(&self, request: &ValidatedRequest)
        -> Result<OptimizationSummary, DispatchError>;
    async fn examples(&self) -> Result<ExampleCatalog, DispatchError>;
    async fn health(&self) -> Result<HealthStatus, DispatchError>;
}
