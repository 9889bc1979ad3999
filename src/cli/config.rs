//! Configuration file
//!
//! ```json
//! {
//!   "database_path": "./tablefetch.db",
//!   "http": { "host": "0.0.0.0", "port": 8000, "cors_origins": [] },
//!   "registry": { "convention": true, "entities": { "Invoice": "tabInvoice" } }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::EntityRegistry;
use crate::http_server::HttpServerConfig;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file (required)
    pub database_path: String,

    /// HTTP bind and CORS settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Entity name to physical table mapping
    #[serde(default)]
    pub registry: EntityRegistry,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.database_path.trim().is_empty() {
            return Err(CliError::config_error("database_path must not be empty"));
        }

        self.registry
            .validate()
            .map_err(|e| CliError::config_error(format!("Registry config error: {}", e)))?;

        Ok(())
    }

    /// Get database path as Path
    pub fn database_path(&self) -> &Path {
        Path::new(&self.database_path)
    }
}
