use crate::infrastructure::config::UpstreamPolicy;
use crate::infrastructure::credentials::{CredentialError, CredentialProvider};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::{
    strategy::{jitter, ExponentialFactorBackoff},
    Retry, RetryError,
};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Transport failures, throttling and server errors are worth another try
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Thin JSON-over-HTTP client for an OpenAI-compatible API.
///
/// Draws a fresh credential for every attempt and applies the configured
/// timeout and backoff policy.
pub struct UpstreamClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    policy: UpstreamPolicy,
}

impl UpstreamClient {
    pub fn new(
        base_url: String,
        credentials: Arc<dyn CredentialProvider>,
        policy: UpstreamPolicy,
    ) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            policy,
        })
    }

    /// POST a JSON body to `path` and return the raw response body
    pub async fn post_json<T>(&self, path: &str, body: &T) -> Result<Vec<u8>, UpstreamError>
    where
        T: Serialize + Sync,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let url = url.as_str();

        let retry_strategy = backoff_schedule(&self.policy).map(jitter);

        Retry::spawn(retry_strategy, || async move {
            match self.send_once(url, body).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(error = %e, url = url, "Upstream call failed, may retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }

    async fn send_once<T>(&self, url: &str, body: &T) -> Result<Vec<u8>, UpstreamError>
    where
        T: Serialize + Sync,
    {
        let credential = self.credentials.next()?;

        let response = self
            .http_client
            .post(url)
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = status.as_u16(),
                body = %error_text,
                url = url,
                "Upstream API error"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Delays between attempts before jitter: `initial, 2 * initial, 4 * initial, ...`
/// capped at `max_delay`, one per allowed retry
fn backoff_schedule(policy: &UpstreamPolicy) -> impl Iterator<Item = Duration> {
    ExponentialFactorBackoff::from_millis(policy.initial_backoff_ms, 2.0)
        .max_delay(policy.max_delay)
        .take(policy.max_retries)
}
