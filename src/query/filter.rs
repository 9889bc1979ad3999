//! # Filter Normalizer
//!
//! Turns caller filter input into an ordered set of `(field, operator, value)`
//! triples combined with AND.
//!
//! Accepted shapes:
//! - mapping: `{"status": "Paid"}`, `{"age": [">=", 18]}`,
//!   `{"age": {"operator": ">=", "value": 18}}`
//! - list of triples: `[["age", ">=", 18], ["status", "in", ["Paid", "Draft"]]]`
//!
//! Text that does not decode as JSON, or decodes to anything other than a
//! mapping or list, means "no filters". A field name that fails validation
//! inside a decodable structure rejects the request.

use serde::Serialize;
use serde_json::Value;

use super::errors::QueryResult;
use super::identifier::validate_field;
use super::input::{value_to_text, Decoded, RawInput};
use super::operator::{render_clause, ClauseFragment, OperatorTag};

/// One filter condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterTriple {
    /// Column name, validated against the strict pattern
    pub field: String,

    /// Whitelisted operator
    pub operator: OperatorTag,

    /// Scalar, or non-empty list of scalars for `IN`
    pub value: Value,
}

impl FilterTriple {
    /// Validate the field, resolve the operator, check the value shape.
    pub fn new(field: &str, raw_operator: Option<&Value>, value: Value) -> QueryResult<Self> {
        let field = validate_field(field)?;
        let operator = OperatorTag::parse(raw_operator)?;
        operator.check_value(&value)?;
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// Create an equality filter
    pub fn eq(field: &str, value: Value) -> QueryResult<Self> {
        Self::new(field, None, value)
    }

    pub fn to_clause(&self) -> ClauseFragment {
        render_clause(&self.field, self.operator, self.value.clone())
    }
}

/// A set of filters combined with AND logic
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSet {
    pub filters: Vec<FilterTriple>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: FilterTriple) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterTriple> {
        self.filters.iter()
    }

    /// Conditions joined with AND, without the `WHERE` keyword
    pub fn to_clause(&self) -> ClauseFragment {
        ClauseFragment::join(self.filters.iter().map(FilterTriple::to_clause), " AND ")
    }
}

/// Normalize caller filter input.
pub fn normalize_filters(input: &RawInput) -> QueryResult<FilterSet> {
    let filters = match input.decode() {
        Decoded::Mapping(map) => map
            .into_iter()
            .map(|(field, raw)| from_mapping_entry(&field, raw))
            .collect::<QueryResult<Vec<_>>>()?,
        Decoded::Sequence(entries) => entries
            .into_iter()
            .filter_map(from_sequence_entry)
            .collect::<QueryResult<Vec<_>>>()?,
        Decoded::Empty | Decoded::Text(_) | Decoded::Scalar(_) => Vec::new(),
    };
    Ok(FilterSet { filters })
}

/// `field: value`, `field: [op, value]` or `field: {operator, value}`
fn from_mapping_entry(field: &str, raw: Value) -> QueryResult<FilterTriple> {
    match raw {
        Value::Array(mut pair) if pair.len() == 2 => {
            let value = pair.pop().unwrap_or(Value::Null);
            let operator = pair.pop();
            FilterTriple::new(field, operator.as_ref(), value)
        }
        Value::Object(mut object) => {
            let operator = object.remove("operator");
            let value = object.remove("value").unwrap_or(Value::Null);
            FilterTriple::new(field, operator.as_ref(), value)
        }
        value => FilterTriple::new(field, None, value),
    }
}

/// `[field, op, value, ...]`; shorter entries are skipped
fn from_sequence_entry(entry: Value) -> Option<QueryResult<FilterTriple>> {
    match entry {
        Value::Array(mut items) if items.len() >= 3 => {
            items.truncate(3);
            let value = items.pop().unwrap_or(Value::Null);
            let operator = items.pop();
            let field = value_to_text(&items[0]);
            Some(FilterTriple::new(&field, operator.as_ref(), value))
        }
        _ => None,
    }
}
