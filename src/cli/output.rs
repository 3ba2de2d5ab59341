//! CLI output: result rendering and error mapping for the CLI surface.

use crate::error::ApiError;
use serde_json::Value;

/// Map client/config errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Unresponsive { .. } => format!("{} (is the VM API reachable?)", e),
        other => other.to_string(),
    }
}

/// Pretty JSON for a command result.
pub(crate) fn render(value: &Value) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}
