//! # HTTP Errors
//!
//! Maps pipeline failures onto HTTP status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryError;

/// Result type for HTTP handlers
pub type ServerResult<T> = Result<T, ServerError>;

/// HTTP surface errors
#[derive(Debug, Error)]
pub enum ServerError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body is not a valid fetch request
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Pipeline rejected or failed the request
    #[error("{0}")]
    Query(#[from] QueryError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Worker task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ServerError::Query(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ServerError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::InvalidBody(_) => "SERVER_INVALID_BODY",
            ServerError::Query(err) => err.code(),
            ServerError::Internal(_) => "SERVER_INTERNAL",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<&ServerError> for ErrorResponse {
    fn from(err: &ServerError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
