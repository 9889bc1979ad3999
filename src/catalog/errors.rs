//! # Catalog Errors

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Entity has no registered physical table
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Catalog maps an entity to a table name that is unsafe to embed
    #[error("Invalid physical table name: {0:?}")]
    InvalidTable(String),

    /// Backing store failure (connection, prepare, execution)
    #[error("Backing store error: {0}")]
    Backend(String),
}

impl CatalogError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::UnknownEntity(_) => "CATALOG_UNKNOWN_ENTITY",
            CatalogError::InvalidTable(_) => "CATALOG_INVALID_TABLE",
            CatalogError::Backend(_) => "CATALOG_BACKEND",
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Backend(err.to_string())
    }
}
