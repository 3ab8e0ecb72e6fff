//! HTTP pull transport backed by reqwest

use crate::error::{ConsoleError, Result};
use crate::types::options::ConsoleOptions;

use super::{Method, PullTransport};

/// Pull transport talking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    options: ConsoleOptions,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(options: &ConsoleOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| ConsoleError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            options: options.clone(),
        })
    }
}

/// Pull the `detail` string out of a FastAPI-style error body
fn error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(String::from)
}

impl PullTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = self.options.api_url(path);
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConsoleError::transport(format!("{method} {path} failed: {e}")))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            ConsoleError::transport(format!("Failed to read {method} {path} response: {e}"))
        })?;

        if !status.is_success() {
            return Err(ConsoleError::rejected(status.as_u16(), error_detail(&bytes)));
        }

        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ConsoleError::transport(format!("Undecodable {method} {path} response: {e}"))
        })
    }
}
