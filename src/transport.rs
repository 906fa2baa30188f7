use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::TransportError;

/// Fetches one decoded json payload. No retries: a failed call degrades its
/// exchange for the current cycle only.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, TransportError>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("direct_arb_scan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Connect {
                url: String::new(),
                reason: format!("client build error: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else if let Some(status) = e.status() {
            TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            TransportError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Value, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?
            .error_for_status()
            .map_err(|e| self.classify(url, e))?;

        let body = resp.text().await.map_err(|e| self.classify(url, e))?;
        serde_json::from_str::<Value>(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            reason: format!(
                "{}. First 100 chars: {}",
                e,
                body.chars().take(100).collect::<String>()
            ),
        })
    }
}
