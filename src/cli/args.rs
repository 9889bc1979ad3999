//! CLI argument definitions using clap
//!
//! Commands:
//! - tablefetch serve --config <path>
//! - tablefetch query --config <path>
//! - tablefetch explain --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tablefetch - read-only ad-hoc table queries
#[derive(Parser, Debug)]
#[command(name = "tablefetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the fetch API over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tablefetch.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one fetch request read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./tablefetch.json")]
        config: PathBuf,
    },

    /// Print the statement a fetch request would run, without running it
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./tablefetch.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
