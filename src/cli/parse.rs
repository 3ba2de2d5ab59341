//! CLI parse: clap types for cursorpage. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cursorpage CLI - walk, query, and batch-call a paginated VM API
#[derive(Parser)]
#[command(name = "cursorpage")]
#[command(about = "Cursor-paginated VM API client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/config.toml is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the VM API (overrides client.base_url)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every page of a paginated endpoint
    Fetch {
        /// Endpoint path, e.g. `transactions`
        path: String,
        /// Query parameter as name=value (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
        /// Ordering scope
        #[arg(long)]
        sort_by: Option<String>,
        /// Walk the scope in reverse
        #[arg(long)]
        reverse: bool,
        /// Page size requested from the server
        #[arg(long)]
        max_results: Option<i64>,
        /// Stop once at least this many results were collected
        #[arg(long)]
        cap: Option<usize>,
    },
    /// Run one contract static call
    Call {
        /// Contract address
        contract: String,
        /// Function name
        function: String,
        /// Arguments as JSON (default: null)
        #[arg(long)]
        args: Option<String>,
    },
    /// Run a JSON file of static calls concurrently
    Batch {
        /// File holding `[{"contract", "function", "args"}, ...]`
        file: PathBuf,
        /// Upper bound on concurrent calls (overrides client.max_in_flight)
        #[arg(long)]
        max_in_flight: Option<usize>,
    },
    /// Show one transaction
    Tx {
        /// Transaction hash
        hash: String,
    },
    /// Show service status counters
    Status,
}
