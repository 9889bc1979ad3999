//! Loosely-typed request input
//!
//! Callers hand us query-string text (`?filters={"a":1}`), native JSON from
//! a request body, or nothing at all. `RawInput` records where a value came
//! from; `decode` turns it into one `Decoded` shape that the filter, sort
//! and field normalizers each map with a single rule per variant.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A request parameter as received
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawInput {
    /// Parameter not supplied (or JSON `null`)
    #[default]
    Absent,
    /// Text that may or may not hold JSON
    Text(String),
    /// Already-decoded JSON
    Json(Value),
}

/// Canonical shape of a decoded parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Absent, blank, or a falsy JSON value (`null`, `false`, `0`, `""`, `[]`, `{}`)
    Empty,
    /// JSON object
    Mapping(Map<String, Value>),
    /// JSON array
    Sequence(Vec<Value>),
    /// Text that is not valid JSON, trimmed
    Text(String),
    /// Any other JSON value, including a JSON string
    Scalar(Value),
}

impl RawInput {
    pub fn text(value: impl Into<String>) -> Self {
        RawInput::Text(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawInput::Absent)
    }

    /// Decode into a canonical shape.
    ///
    /// Strings are decoded as JSON whether they arrived as text or as a
    /// JSON string value; failure to decode yields `Decoded::Text`.
    pub fn decode(&self) -> Decoded {
        match self {
            RawInput::Absent => Decoded::Empty,
            RawInput::Text(text) => decode_text(text),
            RawInput::Json(Value::String(text)) => decode_text(text),
            RawInput::Json(value) => classify(value.clone()),
        }
    }

    /// Integer reading for pagination parameters.
    ///
    /// Numeric strings are trimmed and parsed; JSON floats are truncated
    /// toward zero. Anything else is `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawInput::Absent => None,
            RawInput::Text(text) | RawInput::Json(Value::String(text)) => {
                text.trim().parse::<i64>().ok()
            }
            RawInput::Json(Value::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            RawInput::Json(_) => None,
        }
    }
}

fn decode_text(text: &str) -> Decoded {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decoded::Empty;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => classify(value),
        Err(_) => Decoded::Text(trimmed.to_string()),
    }
}

fn classify(value: Value) -> Decoded {
    if is_falsy(&value) {
        return Decoded::Empty;
    }
    match value {
        Value::Object(map) => Decoded::Mapping(map),
        Value::Array(items) => Decoded::Sequence(items),
        other => Decoded::Scalar(other),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Render a JSON value the way it would read as an identifier:
/// strings without quotes, everything else as JSON text.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawInput::Absent,
            other => RawInput::Json(other),
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        RawInput::Text(value.to_string())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        RawInput::Text(value)
    }
}

impl From<Option<String>> for RawInput {
    fn from(value: Option<String>) -> Self {
        value.map(RawInput::Text).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawInput::from)
    }
}
