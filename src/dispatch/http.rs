use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::dispatch::{
    DispatchError, OptimizationService, EXAMPLES_PATH, HEALTH_PATH, OPTIMIZE_DETAILED_PATH,
    OPTIMIZE_PATH,
};
use crate::model::{
    DetailedOptimization, ExampleCatalog, HealthStatus, OptimizationSummary, ValidatedRequest,
};

const BODY_PREVIEW_CHARS: usize = 180;

/// reqwest-backed client for the optimization service.
#[derive(Debug, Clone)]
pub struct HttpOptimizer {
    client: Client,
    base_url: String,
}

impl HttpOptimizer {
    pub fn new(settings: &ServiceConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|error| DispatchError::Setup(error.to_string()))?;
        Ok(Self::with_client(client, &settings.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, DispatchError> {
        let response = request.send().await.map_err(|error| {
            if error.is_builder() {
                DispatchError::Setup(error.to_string())
            } else {
                warn!("request to {url} failed: {error}");
                DispatchError::Unreachable {
                    url: url.to_string(),
                    reason: error.to_string(),
                }
            }
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| DispatchError::Unreachable {
                url: url.to_string(),
                reason: format!("failed reading response body: {error}"),
            })?;

        if !status.is_success() {
            let detail = extract_detail(&body).unwrap_or_else(|| synthesize_detail(status));
            warn!("{url} returned {status}: {detail}");
            return Err(DispatchError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|error| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            debug!("undecodable body from {url}: {preview}");
            DispatchError::Decode {
                url: url.to_string(),
                reason: error.to_string(),
            }
        })
    }
}

#[async_trait]
impl OptimizationService for HttpOptimizer {
    async fn optimize_detailed(
        &self,
        request: &ValidatedRequest,
    ) -> Result<DetailedOptimization, DispatchError> {
        let url = self.url(OPTIMIZE_DETAILED_PATH);
        info!(
            "submitting {} entries with capacity {} to {url}",
            request.entries().len(),
            request.capacity()
        );
        self.send(self.client.post(&url).json(request), &url).await
    }

    async fn optimize(
        &self,
        request: &ValidatedRequest,
    ) -> Result<OptimizationSummary, DispatchError> {
        let url = self.url(OPTIMIZE_PATH);
        info!("submitting {} entries to {url}", request.entries().len());
        self.send(self.client.post(&url).json(request), &url).await
    }

    async fn examples(&self) -> Result<ExampleCatalog, DispatchError> {
        let url = self.url(EXAMPLES_PATH);
        self.send(self.client.get(&url), &url).await
    }

    async fn health(&self) -> Result<HealthStatus, DispatchError> {
        let url = self.url(HEALTH_PATH);
        self.send(self.client.get(&url), &url).await
    }
}

/// Pulls `detail` out of an error body. Strings are used verbatim, other JSON
/// values compactly; blank or absent details yield `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

pub fn synthesize_detail(status: StatusCode) -> String {
    format!(
        "Error {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}
