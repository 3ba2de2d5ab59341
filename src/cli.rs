//! CLI domain: parse, route, and output only.
//! Route handlers stay thin; the client does the work.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::{parse_params, RunContext};
