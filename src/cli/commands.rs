//! CLI command implementations
//!
//! Every command loads the config and opens the SQLite catalog read-only.
//! `query` and `explain` read one JSON request from stdin and write one
//! JSON envelope to stdout; their logs go to stderr.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{Catalog, SqliteCatalog};
use crate::http_server::HttpServer;
use crate::observability::{Event, Logger};
use crate::query::{FetchRequest, QueryError, QueryService};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{error_envelope, ok_envelope, read_request, write_json};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Query { config } => query(&config),
        Command::Explain { config } => explain(&config),
    }
}

/// Serve the fetch API until the listener fails
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let logger = Logger::stdout();
    let mut config = load_config(config_path, &logger)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let service = Arc::new(open_service(&config, logger.clone())?);
    let server = HttpServer::with_config(config.http, service, logger);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Execute one fetch request from stdin
pub fn query(config_path: &Path) -> CliResult<()> {
    let logger = Logger::stderr();
    let config = load_config(config_path, &logger)?;
    let service = open_service(&config, logger)?;

    let request = read_request()?;
    write_json(&fetch_envelope(&service, request))
}

/// Assemble one fetch request from stdin without executing it
pub fn explain(config_path: &Path) -> CliResult<()> {
    let logger = Logger::stderr();
    let config = load_config(config_path, &logger)?;
    let service = open_service(&config, logger)?;

    let request = read_request()?;
    write_json(&explain_envelope(&service, request))
}

/// Run `request` and wrap the rows (or the failure) in a response envelope
pub fn fetch_envelope<C: Catalog>(service: &QueryService<C>, request: Value) -> Value {
    into_envelope(try_fetch(service, request))
}

/// Plan `request` and wrap the assembled statement (or `null`) in an envelope
pub fn explain_envelope<C: Catalog>(service: &QueryService<C>, request: Value) -> Value {
    into_envelope(try_explain(service, request))
}

fn try_fetch<C: Catalog>(service: &QueryService<C>, request: Value) -> Result<Value, Failure> {
    let request = decode_request(request)?;
    let rows = service.fetch(&request)?;
    Ok(serde_json::to_value(rows).map_err(CliError::from)?)
}

fn try_explain<C: Catalog>(service: &QueryService<C>, request: Value) -> Result<Value, Failure> {
    let request = decode_request(request)?;
    let plan = service.plan(&request)?;
    Ok(serde_json::to_value(plan).map_err(CliError::from)?)
}

fn load_config(path: &Path, logger: &Logger) -> CliResult<Config> {
    let config = Config::load(path)?;
    let path = path.display().to_string();
    logger.log(
        Event::ConfigLoaded,
        &[
            ("database_path", config.database_path.as_str()),
            ("path", path.as_str()),
        ],
    );
    Ok(config)
}

fn open_service(config: &Config, logger: Logger) -> CliResult<QueryService<SqliteCatalog>> {
    let catalog = SqliteCatalog::open_read_only(config.database_path(), config.registry.clone())?;
    Ok(QueryService::with_logger(catalog, logger))
}

fn decode_request(request: Value) -> CliResult<FetchRequest> {
    serde_json::from_value(request).map_err(|e| CliError::invalid_request(e.to_string()))
}

/// Error half of a response envelope
struct Failure {
    code: &'static str,
    message: String,
}

impl From<QueryError> for Failure {
    fn from(err: QueryError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<CliError> for Failure {
    fn from(err: CliError) -> Self {
        Self {
            code: err.code_str(),
            message: err.message().to_string(),
        }
    }
}

fn into_envelope(result: Result<Value, Failure>) -> Value {
    match result {
        Ok(data) => ok_envelope(data),
        Err(failure) => error_envelope(failure.code, &failure.message),
    }
}
