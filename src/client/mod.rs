//! Remote VM Client
//!
//! Consumes the same cursor pagination protocol the [`Paginator`](crate::paginate::Paginator)
//! serves, plus the point endpoints of the VM service (transactions, status,
//! token state, contract static calls). Every outbound argument is canonicalized
//! and every call is bounded by its own timeout.

use crate::error::ApiError;
use crate::numeric::canonicalize;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub mod batch;
pub mod transport;
pub mod walker;

pub use transport::{HttpTransport, Transport};
pub use walker::CURSOR_PAGINATION_FLAG;

/// Remote client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the VM API, e.g. `https://vm.example.org/api`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sent as `Authorization: Bearer <token>` when set
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on concurrent calls of one batch (unbounded when absent)
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// How long `cached_current_block_number` reuses a fetched value
    #[serde(default = "default_block_number_ttl_secs")]
    pub block_number_ttl_secs: u64,
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_block_number_ttl_secs() -> u64 {
    3
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout_ms: default_timeout_ms(),
            max_in_flight: None,
            block_number_ttl_secs: default_block_number_ttl_secs(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("base_url must be an http(s) URL, got '{}'", url));
            }
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.max_in_flight == Some(0) {
            return Err("max_in_flight must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// One contract static call of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCall {
    pub contract: String,
    pub function: String,
    #[serde(default)]
    pub args: Value,
}

impl StaticCall {
    pub fn new(contract: impl Into<String>, function: impl Into<String>, args: Value) -> Self {
        Self {
            contract: contract.into(),
            function: function.into(),
            args,
        }
    }
}

/// Client for the remote VM API
pub struct VmClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    max_in_flight: Option<usize>,
    block_number_ttl: Duration,
    block_number_cache: Mutex<Option<(u64, Instant)>>,
}

impl VmClient {
    /// HTTP client for `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| ApiError::ConfigError("client.base_url is not set".to_string()))?;
        let transport = HttpTransport::new(base_url, config.bearer_token.clone(), config.timeout())?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Client over any transport; only the timing fields of `config` are used.
    pub fn with_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            timeout: config.timeout(),
            max_in_flight: config.max_in_flight,
            block_number_ttl: Duration::from_secs(config.block_number_ttl_secs),
            block_number_cache: Mutex::new(None),
        }
    }

    /// One GET bounded by the per-call timeout.
    pub async fn request(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        match tokio::time::timeout(self.timeout, self.transport.get(path, query)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Unresponsive {
                timeout: self.timeout,
            }),
        }
    }

    pub async fn get_transaction(&self, transaction_hash: &str) -> Result<Value, ApiError> {
        let body = self
            .request(&format!("transactions/{}", transaction_hash), &[])
            .await?;
        into_result(body)
    }

    /// Status counters, with every value coerced to an integer.
    pub async fn get_status(&self) -> Result<BTreeMap<String, u64>, ApiError> {
        let body = self.request("status", &[]).await?;
        if let Some(error) = body.get("error") {
            return Err(ApiError::Remote(error_message(error)));
        }
        let fields = body
            .as_object()
            .ok_or_else(|| ApiError::MalformedResponse("status is not an object".to_string()))?;

        fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), coerce_u64(name, value)?)))
            .collect()
    }

    /// `current_block_number` from `status`, reused for the configured TTL.
    pub async fn cached_current_block_number(&self) -> Result<u64, ApiError> {
        let cached = *self.block_number_cache.lock();
        if let Some((number, fetched_at)) = cached {
            if fetched_at.elapsed() < self.block_number_ttl {
                return Ok(number);
            }
        }

        let status = self.get_status().await?;
        let number = *status.get("current_block_number").ok_or_else(|| {
            ApiError::MalformedResponse("status has no current_block_number".to_string())
        })?;
        *self.block_number_cache.lock() = Some((number, Instant::now()));
        debug!(current_block_number = number, "Refreshed block number cache");
        Ok(number)
    }

    pub async fn get_historical_token_state(
        &self,
        contract: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let body = self
            .request(
                &format!("tokens/{}/historical_token_state", contract),
                &query_pairs(params),
            )
            .await?;
        into_result(body)
    }

    /// Read-only contract call.
    ///
    /// Timeouts and server failures are reported the same way as an `{error}`
    /// body: as [`ApiError::StaticCall`] carrying the message.
    pub async fn static_call(&self, call: &StaticCall) -> Result<Value, ApiError> {
        let args = serde_json::to_string(&canonicalize(&call.args))?;
        let path = format!("contracts/{}/static-call/{}", call.contract, call.function);

        let body = match self.request(&path, &[("args".to_string(), args)]).await {
            Ok(body) => body,
            Err(
                e @ (ApiError::Unresponsive { .. }
                | ApiError::ServerError { .. }
                | ApiError::Transport(_)
                | ApiError::MalformedResponse(_)),
            ) => return Err(ApiError::StaticCall(e.to_string())),
            Err(e) => return Err(e),
        };

        match body.get("error") {
            Some(error) => Err(ApiError::StaticCall(error_message(error))),
            None => Ok(body.get("result").cloned().unwrap_or(Value::Null)),
        }
    }
}

/// `result` of a response body, or its `error` as [`ApiError::Remote`].
fn into_result(body: Value) -> Result<Value, ApiError> {
    if let Some(error) = body.get("error") {
        return Err(ApiError::Remote(error_message(error)));
    }
    Ok(body.get("result").cloned().unwrap_or(Value::Null))
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.trim().to_string(),
        other => other.to_string(),
    }
}

/// Leading integer of a status field, 0 when there is none.
///
/// A negative value or one past `u64::MAX` is a [`ApiError::MalformedResponse`].
fn coerce_u64(name: &str, value: &Value) -> Result<u64, ApiError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        Value::Bool(true) => return Ok(1),
        _ => return Ok(0),
    };
    let out_of_range = || {
        ApiError::MalformedResponse(format!("status field '{}' is out of range: {}", name, text))
    };

    if let Some(magnitude) = text.strip_prefix('-') {
        if magnitude.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(out_of_range());
        }
    }
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse().map_err(|_| out_of_range())
}

/// Flatten canonicalized parameters into query pairs.
///
/// Scalars are sent as-is, arrays of scalars as repeated `name[]` pairs, and
/// anything nested as JSON text. Nulls are omitted.
pub fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in params {
        match canonicalize(value) {
            Value::Null => {}
            Value::Array(items) if items.iter().all(is_scalar) => {
                let array_name = format!("{}[]", name);
                for item in items {
                    if let Some(text) = scalar_text(&item) {
                        pairs.push((array_name.clone(), text));
                    }
                }
            }
            other => {
                let text = scalar_text(&other).unwrap_or_else(|| other.to_string());
                pairs.push((name.clone(), text));
            }
        }
    }
    pairs
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
