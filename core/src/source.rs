// Cluster status source
//
// Reads replicated log status from the coordinator's HTTP API, plus the
// per-server local status used to spot a recovering leader.

use crate::error::SourceError;
use crate::status::{LocalStatus, RawStatus};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP status source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Coordinator base URL
    pub coordinator_url: String,
    /// Replicated log id
    pub log_id: u64,
    /// Timeout for API requests in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://localhost:8530".to_string(),
            log_id: 12,
            timeout_ms: 10_000,
            user_agent: "logwatch/0.1".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            coordinator_url: std::env::var("LOGWATCH_COORDINATOR_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(default.coordinator_url),
            log_id: std::env::var("LOGWATCH_LOG_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.log_id),
            timeout_ms: std::env::var("LOGWATCH_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.timeout_ms),
            user_agent: default.user_agent,
        }
    }
}

/// Where raw cluster status comes from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<RawStatus, SourceError>;

    async fn local_status(&self, participant: &str) -> Result<LocalStatus, SourceError>;
}

/// `{"result": ...}` wrapper used by every API reply
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LocalStatusResult {
    manager: Option<LocalStatus>,
}

pub struct HttpStatusSource {
    config: SourceConfig,
    http_client: reqwest::Client,
}

impl HttpStatusSource {
    pub fn new(config: SourceConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    fn log_url(&self) -> String {
        format!(
            "{}/_api/log/{}",
            self.config.coordinator_url.trim_end_matches('/'),
            self.config.log_id
        )
    }

    fn local_status_request(&self, participant: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}/local-status", self.log_url()))
            .query(&[("server", participant)])
    }

    async fn get_result<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, SourceError> {
        debug!(target: "source", url = %url, "GET");
        let response = request.send().await.map_err(|e| {
            warn!(target: "source", url = %url, error = %e, "Status request failed");
            SourceError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(target: "source", status = %status, "Status API returned error");
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        envelope
            .result
            .ok_or_else(|| SourceError::Payload(format!("no `result` in reply from {}", url)))
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self) -> Result<RawStatus, SourceError> {
        let url = self.log_url();
        self.get_result(self.http_client.get(&url), &url).await
    }

    async fn local_status(&self, participant: &str) -> Result<LocalStatus, SourceError> {
        let url = format!("{}/local-status", self.log_url());
        let result: LocalStatusResult = self
            .get_result(self.local_status_request(participant), &url)
            .await?;
        Ok(result.manager.unwrap_or_default())
    }
}

/// Leader commit index, or with `server` set, that follower's spearhead
/// index as the leader sees it.
pub async fn query_commit_index<S>(source: &S, server: Option<&str>) -> Result<u64, SourceError>
where
    S: StatusSource + ?Sized,
{
    let status = source.fetch_status().await?;
    status.commit_index(server).ok_or_else(|| {
        SourceError::Payload(match server {
            Some(id) => format!("leader reports no spearhead for {}", id),
            None => "no leader commit index".to_string(),
        })
    })
}
