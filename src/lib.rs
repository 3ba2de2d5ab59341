//! cursorpage: Keyset Pagination and Cursor-Walking VM Client
//!
//! Serves stable, stateless cursor pages over ordered collections and consumes
//! the same protocol from a remote VM API: walking every page, dispatching
//! concurrent static calls, and canonicalizing every numeric argument so no
//! precision is lost on the wire.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod model;
pub mod numeric;
pub mod order;
pub mod paginate;
