//! # Sort Normalizer
//!
//! Accepts `"fee desc, name"`, `["fee desc", ["name", "asc"]]` or the JSON
//! text of either. Direction defaults to ASC; an entry with any direction
//! other than ASC/DESC is skipped on its own.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::errors::QueryResult;
use super::identifier::{quote, validate_field};
use super::input::{value_to_text, Decoded, RawInput};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `asc` / `desc`
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ASC" => Some(Direction::Asc),
            "DESC" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Order by clause entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", quote(&self.field), self.direction.as_sql())
    }
}

/// Ordered sort keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `` `a` ASC, `b` DESC ``, without the `ORDER BY` keyword
    pub fn to_clause(&self) -> String {
        self.keys
            .iter()
            .map(SortKey::to_sql)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Normalize caller `order_by` input.
pub fn normalize_order_by(input: &RawInput) -> QueryResult<SortSpec> {
    let entries: Vec<Value> = match input.decode() {
        Decoded::Text(text) | Decoded::Scalar(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Value::from)
            .collect(),
        Decoded::Sequence(items) => items,
        Decoded::Empty | Decoded::Mapping(_) | Decoded::Scalar(_) => Vec::new(),
    };

    let mut keys = Vec::new();
    for entry in &entries {
        if let Some(key) = parse_entry(entry)? {
            keys.push(key);
        }
    }
    Ok(SortSpec { keys })
}

/// `"field [dir]"` or `[field, dir]`. The field is validated before the
/// direction is looked at, so a bad field always rejects.
fn parse_entry(entry: &Value) -> QueryResult<Option<SortKey>> {
    let (field, direction) = match entry {
        Value::String(text) => {
            let mut tokens = text.split_whitespace();
            let Some(field) = tokens.next() else {
                return Ok(None);
            };
            (field.to_string(), tokens.next().map(Value::from))
        }
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return Ok(None);
            };
            (value_to_text(first), items.get(1).cloned())
        }
        _ => return Ok(None),
    };

    let field = validate_field(&field)?;
    let direction = match direction {
        None => Some(Direction::Asc),
        Some(Value::String(token)) => Direction::parse(&token),
        Some(_) => None,
    };

    Ok(direction.map(|direction| SortKey::new(field, direction)))
}
