//! HTTP transport backed by reqwest.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::Transport;
use crate::utils::error::{ToolboxError, ToolboxResult};

/// [`Transport`] implementation over a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with reqwest's default configuration.
    pub fn new() -> ToolboxResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ToolboxError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Creates a transport with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> ToolboxResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolboxError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Converts a non-2xx response into a [`ToolboxError::Transport`] carrying
/// the status and the response body.
async fn check_status(response: reqwest::Response) -> ToolboxResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| status.to_string());
    Err(ToolboxError::Transport {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> ToolboxResult<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolboxError::Connection(format!("HTTP request failed: {}", e)))?;

        check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| ToolboxError::Connection(format!("Failed to read response: {}", e)))
    }

    async fn post(
        &self,
        url: &Url,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> ToolboxResult<Value> {
        debug!("POST {}", url);
        let mut request = self.client.post(url.clone()).json(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ToolboxError::Connection(format!("HTTP request failed: {}", e)))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ToolboxError::Connection(format!("Failed to parse response: {}", e)))
    }
}
