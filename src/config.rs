//! Configuration System
//!
//! Layered configuration for the pagination engine and the remote client. Sources,
//! lowest precedence first: built-in defaults, the user config file, the workspace
//! config files, then `CURSORPAGE__*` environment variables.

use crate::auth::TokenAuthorizer;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::paginate::LimitPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::client::ClientConfig;

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CursorpageConfig {
    /// Remote VM client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Page size policy
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Tokens that lift the page size limit
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Page size policy for unauthorized callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    #[serde(default = "default_results_limit")]
    pub results_limit: usize,
}

fn default_max_results() -> usize {
    25
}

fn default_results_limit() -> usize {
    50
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            results_limit: default_results_limit(),
        }
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.results_limit == 0 {
            return Err("results_limit must be greater than 0".to_string());
        }
        if self.default_max_results == 0 || self.default_max_results > self.results_limit {
            return Err(format!(
                "default_max_results must be between 1 and results_limit ({})",
                self.results_limit
            ));
        }
        Ok(())
    }

    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            default_max_results: self.default_max_results,
            results_limit: self.results_limit,
        }
    }
}

/// Accepted bearer tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl AuthConfig {
    /// Authorizer over the configured tokens, or over `API_AUTH_TOKENS` when none are configured.
    pub fn authorizer(&self) -> TokenAuthorizer {
        if self.tokens.is_empty() {
            TokenAuthorizer::from_env()
        } else {
            TokenAuthorizer::new(self.tokens.iter().cloned())
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Client(String),
    Pagination(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Client(msg) => write!(f, "client: {}", msg),
            ValidationError::Pagination(msg) => write!(f, "pagination: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CursorpageConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.client.validate() {
            errors.push(ValidationError::Client(e));
        }
        if let Err(e) = self.pagination.validate() {
            errors.push(ValidationError::Pagination(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`CursorpageConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<CursorpageConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let config: CursorpageConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load from a single file (plus defaults and environment), skipping discovery.
    pub fn load_from_file(path: &Path) -> Result<CursorpageConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let builder = merge::builder_with_defaults()?.add_source(config::File::from(path));
        let builder = sources::environment::add_to_builder(builder);

        let config: CursorpageConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Path of the user-level config file, if a home directory is known.
    pub fn global_config_path() -> Option<std::path::PathBuf> {
        sources::global_file::global_config_path()
    }

    fn validated(config: CursorpageConfig) -> Result<CursorpageConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
