//! Environment source: `CURSORPAGE__CLIENT__BASE_URL=...` and friends.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// Add environment overrides (highest precedence) to builder.
/// `CURSORPAGE__AUTH__TOKENS` takes a comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CURSORPAGE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("auth.tokens"),
    )
}
