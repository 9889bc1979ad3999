//! Identifier validation
//!
//! Parameter binding protects values, never identifiers. Anything embedded
//! literally into query text goes through here first.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::errors::{QueryError, QueryResult};

/// Entity names may be human readable: letters, digits, space, `_`, `-`.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 _-]+$").expect("entity pattern is a valid regex")
});

/// Column names: letters, digits, `_` only.
static COLUMN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("column pattern is a valid regex"));

/// Which identifier pattern applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Entity or physical table name (permissive)
    Entity,
    /// Column name (strict)
    Column,
}

impl IdentifierKind {
    fn pattern(&self) -> &'static Regex {
        match self {
            IdentifierKind::Entity => &ENTITY_PATTERN,
            IdentifierKind::Column => &COLUMN_PATTERN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Entity => "entity",
            IdentifierKind::Column => "column",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accept `candidate` only if it is non-empty and fully matches `kind`'s pattern.
pub fn validate_identifier(candidate: &str, kind: IdentifierKind) -> QueryResult<&str> {
    if candidate.is_empty() || !kind.pattern().is_match(candidate) {
        return Err(QueryError::InvalidIdentifier {
            kind,
            value: candidate.to_string(),
        });
    }
    Ok(candidate)
}

pub fn validate_entity(candidate: &str) -> QueryResult<&str> {
    validate_identifier(candidate, IdentifierKind::Entity)
}

pub fn validate_column(candidate: &str) -> QueryResult<&str> {
    validate_identifier(candidate, IdentifierKind::Column)
}

/// Column check used inside filter and sort structures, where a failure
/// is reported as a bad field rather than a bad identifier.
pub(crate) fn validate_field(candidate: &str) -> QueryResult<String> {
    validate_column(candidate)
        .map(str::to_string)
        .map_err(|_| QueryError::InvalidField(candidate.to_string()))
}

/// Backtick-quote an identifier that has already been validated.
pub(crate) fn quote(identifier: &str) -> String {
    format!("`{}`", identifier)
}
