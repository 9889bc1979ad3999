//! # HTTP Server Module
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `GET /api/method/fetch` - fetch with query-string parameters
//! - `POST /api/method/fetch` - fetch with a JSON body
//! - `POST /api/method/explain` - assembled statement without executing

mod config;
mod errors;
mod fetch_routes;
mod server;

pub use config::HttpServerConfig;
pub use errors::{ErrorResponse, ServerError, ServerResult};
pub use fetch_routes::fetch_routes;
pub use server::{HealthResponse, HttpServer};
