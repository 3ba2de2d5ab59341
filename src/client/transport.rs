//! HTTP transport for the remote VM endpoints.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const VM_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues GET requests against the remote service and returns the parsed body.
///
/// Implementations return `Ok` for any JSON body that is not a server failure,
/// including `{ "error": ... }` bodies; callers decide what an error body means.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError>;
}

/// reqwest-backed transport rooted at a base URL
pub struct HttpTransport {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, bearer_token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(VM_HTTP_CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.filter(|token| !token.trim().is_empty()),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_http_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Unresponsive {
                timeout: self.timeout,
            }
        } else if error.is_connect() {
            ApiError::Transport(format!("Connection error: {}", error))
        } else if error.is_decode() {
            ApiError::MalformedResponse(error.to_string())
        } else {
            ApiError::Transport(format!("HTTP error: {}", error))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "GET");

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| self.map_http_error(e))?;
        let status = response.status();

        if status.is_server_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.map_http_error(e))?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(ApiError::ServerError {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ApiError::MalformedResponse(format!(
                "{} returned invalid JSON: {}",
                url, e
            ))),
        }
    }
}
