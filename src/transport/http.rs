//! reqwest-backed transport.

use super::Transport;
use crate::error::TransportError;
use crate::models::ChatReply;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 600,
        }
    }
}

/// Request body shared by both endpoints.
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    message: &'a str,
}

/// HTTP client for the analysis service.
pub struct HttpTransport {
    config: HttpTransportConfig,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_message<T: DeserializeOwned>(
        &self,
        path: &str,
        message: &str,
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&MessageRequest { message })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    TransportError::Connect(self.config.base_url.clone())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned {}", url, status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.config.timeout_seconds)
            } else {
                TransportError::Decode(e.to_string())
            }
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn analyze(&self, subject: &str) -> Result<Value, TransportError> {
        self.post_message("analyze", subject).await
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, TransportError> {
        self.post_message("chat", message).await
    }
}
