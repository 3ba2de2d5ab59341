//! Merge rules: built-in defaults underneath every other source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("client.timeout_ms", 5_000)?
        .set_default("client.block_number_ttl_secs", 3)?
        .set_default("pagination.default_max_results", 25)?
        .set_default("pagination.results_limit", 50)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
