//! # Query Errors
//!
//! Hard validation failures reject the request. Soft data failures never
//! surface here; they are logged and degrade the result instead.

use thiserror::Error;

use crate::catalog::CatalogError;

use super::identifier::IdentifierKind;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query pipeline errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    // ==================
    // Validation (request rejected)
    // ==================
    /// Identifier empty or not matching its pattern
    #[error("Invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: IdentifierKind, value: String },

    /// Field name inside a filter or sort structure failed validation
    #[error("Invalid field name: {0:?}")]
    InvalidField(String),

    /// Filter field is well-formed but not a column of the table
    #[error("Unknown filter field: {0:?}")]
    UnknownField(String),

    /// Operator token outside the whitelist
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Value shape does not fit the operator
    #[error("Invalid filter value: {0}")]
    InvalidFilterValue(String),

    // ==================
    // Backing store
    // ==================
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl QueryError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidIdentifier { .. } => "QUERY_INVALID_IDENTIFIER",
            QueryError::InvalidField(_) => "QUERY_INVALID_FIELD",
            QueryError::UnknownField(_) => "QUERY_UNKNOWN_FIELD",
            QueryError::UnsupportedOperator(_) => "QUERY_UNSUPPORTED_OPERATOR",
            QueryError::InvalidFilterValue(_) => "QUERY_INVALID_FILTER_VALUE",
            QueryError::Catalog(err) => err.code(),
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        !matches!(self, QueryError::Catalog(_))
    }
}
