//! Error types for the pagination engine and the remote VM client.

use std::time::Duration;
use thiserror::Error;

/// Order registry construction errors.
///
/// These only surface while the registry is being built at startup; a built
/// registry never fails a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("page_key_attributes must be present")]
    MissingPageKeyAttributes,

    #[error("Invalid order scope name: {0:?}")]
    InvalidScopeName(String),

    #[error("Order scope '{0}' has no terms")]
    EmptySpec(String),

    #[error("Order scope '{scope}' does not order by page key attribute '{attribute}'")]
    NotTotal { scope: String, attribute: String },

    #[error("Default order scope '{0}' is not registered")]
    UnknownDefault(String),
}

/// Client and runtime errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not responsive after {timeout:?}")]
    Unresponsive { timeout: Duration },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Static call error: {0}")]
    StaticCall(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
