// Client for the anomaly-detection service (reqwest, JSON envelopes)

mod envelope;
mod error;

pub use error::ClientError;

use std::future::Future;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::config::RemoteConfig;
use crate::models::{ActionRequest, ActionResult, MetricSample, SystemStatus};

/// The four operations the dashboard needs from the service.
/// Each call makes exactly one request; no retries, no caching.
pub trait DashboardApi: Send + Sync + 'static {
    fn fetch_status(&self) -> impl Future<Output = Result<SystemStatus, ClientError>> + Send;

    fn fetch_metrics(&self) -> impl Future<Output = Result<Vec<MetricSample>, ClientError>> + Send;

    fn fetch_anomalies(
        &self,
    ) -> impl Future<Output = Result<Vec<MetricSample>, ClientError>> + Send;

    fn perform_action(
        &self,
        request: ActionRequest,
    ) -> impl Future<Output = Result<ActionResult, ClientError>> + Send;
}

pub struct HttpDashboardApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardApi {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Map<String, Value>, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<Map<String, Value>, ClientError> {
        let mut request = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        read_envelope(response).await
    }
}

/// The service answers errors with a JSON envelope and a 4xx/5xx code, so the
/// HTTP status is only logged; the envelope decides success.
async fn read_envelope(response: reqwest::Response) -> Result<Map<String, Value>, ClientError> {
    let code = response.status();
    let bytes = response.bytes().await?;
    if !code.is_success() {
        tracing::debug!(status = code.as_u16(), "service returned non-2xx");
    }
    envelope::parse(&bytes)
}

impl DashboardApi for HttpDashboardApi {
    #[instrument(skip(self), fields(remote = "service", operation = "fetch_status"))]
    async fn fetch_status(&self) -> Result<SystemStatus, ClientError> {
        let mut env = self.get("/status").await?;
        envelope::field(&mut env, "data")
    }

    #[instrument(skip(self), fields(remote = "service", operation = "fetch_metrics"))]
    async fn fetch_metrics(&self) -> Result<Vec<MetricSample>, ClientError> {
        let mut env = self.get("/metrics").await?;
        envelope::list(&mut env, "metrics")
    }

    #[instrument(skip(self), fields(remote = "service", operation = "fetch_anomalies"))]
    async fn fetch_anomalies(&self) -> Result<Vec<MetricSample>, ClientError> {
        let mut env = self.get("/anomalies").await?;
        envelope::list(&mut env, "anomalies")
    }

    #[instrument(skip(self), fields(remote = "service", operation = "perform_action", action = %request.kind()))]
    async fn perform_action(&self, request: ActionRequest) -> Result<ActionResult, ClientError> {
        let env = self.post(request.kind().path(), request.body()).await?;
        envelope::whole(env)
    }
}
