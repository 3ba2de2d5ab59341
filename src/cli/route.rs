//! CLI route: single route table and run context. Dispatches to the VM client.

use crate::cli::output::render;
use crate::cli::parse::Commands;
use crate::client::{StaticCall, VmClient};
use crate::config::{ConfigLoader, CursorpageConfig};
use crate::error::ApiError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

/// Runtime context for CLI execution: loaded config plus the async runtime the client runs on.
pub struct RunContext {
    config: CursorpageConfig,
    runtime: Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        base_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        if base_url.is_some() {
            config.client.base_url = base_url;
            config.client.validate().map_err(ApiError::ConfigError)?;
        }

        let runtime = Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self { config, runtime })
    }

    pub fn config(&self) -> &CursorpageConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Fetch {
                path,
                params,
                sort_by,
                reverse,
                max_results,
                cap,
            } => {
                let mut query = parse_params(params)?;
                if let Some(sort_by) = sort_by {
                    query.insert("sort_by".to_string(), Value::String(sort_by.clone()));
                }
                if *reverse {
                    query.insert("reverse".to_string(), Value::Bool(true));
                }
                if let Some(max_results) = max_results {
                    query.insert("max_results".to_string(), Value::from(*max_results));
                }

                let client = self.client(&self.config)?;
                let results = self
                    .runtime
                    .block_on(client.fetch_all(path, &query, *cap))?;
                info!(path = %path, results = results.len(), "Fetch complete");
                render(&Value::Array(results))
            }
            Commands::Call {
                contract,
                function,
                args,
            } => {
                let args = match args {
                    Some(raw) => serde_json::from_str(raw)?,
                    None => Value::Null,
                };
                let call = StaticCall::new(contract.clone(), function.clone(), args);
                let client = self.client(&self.config)?;
                let result = self.runtime.block_on(client.static_call(&call))?;
                render(&result)
            }
            Commands::Batch {
                file,
                max_in_flight,
            } => {
                let calls = read_calls(file)?;
                let mut config = self.config.clone();
                if max_in_flight.is_some() {
                    config.client.max_in_flight = *max_in_flight;
                    config.client.validate().map_err(ApiError::ConfigError)?;
                }
                let client = self.client(&config)?;
                let results = self.runtime.block_on(client.batch_call(&calls))?;
                info!(calls = calls.len(), "Batch complete");
                render(&Value::Array(results))
            }
            Commands::Tx { hash } => {
                let client = self.client(&self.config)?;
                let transaction = self.runtime.block_on(client.get_transaction(hash))?;
                render(&transaction)
            }
            Commands::Status => {
                let client = self.client(&self.config)?;
                let status = self.runtime.block_on(client.get_status())?;
                render(&serde_json::to_value(status)?)
            }
        }
    }

    fn client(&self, config: &CursorpageConfig) -> Result<VmClient, ApiError> {
        VmClient::new(&config.client)
    }
}

/// Parse `name=value` pairs. Values that parse as JSON keep their JSON type (so
/// `amount=1.50` is a number and gets canonicalized); anything else is a string.
/// A repeated name collects its values into an array.
pub fn parse_params(params: &[String]) -> Result<Map<String, Value>, ApiError> {
    let mut parsed = Map::new();
    for param in params {
        let (name, raw) = param.split_once('=').ok_or_else(|| {
            ApiError::ConfigError(format!("Invalid parameter '{}': expected NAME=VALUE", param))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::ConfigError(format!(
                "Invalid parameter '{}': empty name",
                param
            )));
        }
        let value = serde_json::from_str::<Value>(raw)
            .ok()
            .filter(|v| !v.is_object())
            .unwrap_or_else(|| Value::String(raw.to_string()));

        match parsed.get_mut(name) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                parsed.insert(name.to_string(), value);
            }
        }
    }
    Ok(parsed)
}

fn read_calls(path: &Path) -> Result<Vec<StaticCall>, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ApiError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}
