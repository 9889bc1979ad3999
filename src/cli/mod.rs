//! CLI module for tablefetch
//!
//! Provides command-line interface for:
//! - serve: Serve the fetch API over HTTP
//! - query: One-shot fetch from a JSON request on stdin
//! - explain: One-shot assembly without execution

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, explain_envelope, fetch_envelope, query, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, ok_envelope, parse_request, read_request, write_json};
