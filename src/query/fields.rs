//! Column selection
//!
//! Requested fields are intersected with the table's real columns. Unknown
//! fields are dropped (the caller logs them); an empty intersection falls
//! back to the identifier column.

use std::collections::BTreeSet;

use serde_json::Value;

use super::errors::QueryResult;
use super::identifier::{quote, validate_field};
use super::input::{value_to_text, Decoded, RawInput};

/// Column every entity table is keyed by
pub const IDENTIFIER_COLUMN: &str = "name";

/// Outcome of intersecting requested fields with the column whitelist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    /// Columns to select, in request order, never empty
    pub columns: Vec<String>,
    /// Requested fields absent from the table
    pub dropped: Vec<String>,
}

impl ColumnSelection {
    /// `` `a`, `b` ``
    pub fn to_clause(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Requested field names: JSON array, comma-separated text or one name.
/// Defaults to the identifier column.
pub fn normalize_fields(input: &RawInput) -> Vec<String> {
    let requested: Vec<String> = match input.decode() {
        Decoded::Empty => Vec::new(),
        Decoded::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect(),
        Decoded::Scalar(Value::String(name)) => vec![name],
        Decoded::Scalar(other) => vec![value_to_text(&other)],
        Decoded::Sequence(items) => items.iter().map(value_to_text).collect(),
        Decoded::Mapping(map) => map.keys().cloned().collect(),
    };

    if requested.is_empty() {
        vec![IDENTIFIER_COLUMN.to_string()]
    } else {
        requested
    }
}

/// Keep requested fields that are real columns, in order, without repeats.
pub fn select_columns(requested: &[String], columns: &BTreeSet<String>) -> QueryResult<ColumnSelection> {
    let mut selected: Vec<String> = Vec::new();
    let mut dropped = Vec::new();

    for field in requested {
        if !columns.contains(field) {
            dropped.push(field.clone());
            continue;
        }
        let field = validate_field(field)?;
        if !selected.contains(&field) {
            selected.push(field);
        }
    }

    if selected.is_empty() {
        selected.push(IDENTIFIER_COLUMN.to_string());
    }

    Ok(ColumnSelection {
        columns: selected,
        dropped,
    })
}
