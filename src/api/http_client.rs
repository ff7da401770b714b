use crate::config::HttpClientConfig;
use crate::error::{LtpError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Status and body of a response that reached us, whatever its status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection-level failure: refused, timed out, DNS, broken body stream.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<UpstreamResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_conns)
            .pool_idle_timeout(config.idle_conn_timeout)
            .build()
            .map_err(|e| LtpError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<UpstreamResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // A rejected response still reached us; its body is best-effort.
        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Retries transport failures a bounded number of times with a fixed wait.
/// Any response that arrives, whatever its status, is returned as-is.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    max_retries: u32,
    retry_wait: Duration,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn Transport>, config: &HttpClientConfig) -> Self {
        Self {
            transport,
            max_retries: config.max_retries,
            retry_wait: config.retry_wait,
        }
    }

    pub async fn get(&self, url: &str) -> Result<UpstreamResponse> {
        for attempt in 1..=self.max_retries {
            match self.transport.get(url).await {
                Ok(response) => {
                    debug!("GET {} -> {} (attempt {})", url, response.status, attempt);
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        "Error in connection. Try {}/{}: {}",
                        attempt, self.max_retries, e
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_wait).await;
                    }
                }
            }
        }

        error!("Could not connect to {} after {} retries", url, self.max_retries);
        Err(LtpError::DependencyUnavailable {
            retries: self.max_retries,
        })
    }
}
