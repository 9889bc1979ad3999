//! # Operator / Clause Builder
//!
//! Maps a caller's operator token onto one of eight permitted SQL
//! operators and renders `` `field` OP ? `` fragments with bound values.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use super::identifier::quote;
use super::input::value_to_text;

/// Placeholder for a bound parameter
pub const PLACEHOLDER: &str = "?";

/// The operator whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatorTag {
    /// Equals
    #[serde(rename = "=")]
    Eq,

    /// Not equals
    #[serde(rename = "!=")]
    Neq,

    /// Greater than
    #[serde(rename = ">")]
    Gt,

    /// Less than
    #[serde(rename = "<")]
    Lt,

    /// Greater than or equal
    #[serde(rename = ">=")]
    Gte,

    /// Less than or equal
    #[serde(rename = "<=")]
    Lte,

    /// Pattern match (LIKE)
    #[serde(rename = "like")]
    Like,

    /// Value in list
    #[serde(rename = "in")]
    In,
}

impl OperatorTag {
    /// Resolve a raw operator token.
    ///
    /// Tokens are trimmed and matched case-insensitively. A missing, `null`
    /// or empty token means `=`.
    pub fn parse(raw: Option<&Value>) -> QueryResult<Self> {
        let token = match raw {
            None | Some(Value::Null) => return Ok(OperatorTag::Eq),
            Some(Value::String(s)) if s.is_empty() => return Ok(OperatorTag::Eq),
            Some(Value::String(s)) => s,
            Some(other) => return Err(QueryError::UnsupportedOperator(value_to_text(other))),
        };

        match token.trim().to_lowercase().as_str() {
            "=" => Ok(OperatorTag::Eq),
            "!=" => Ok(OperatorTag::Neq),
            ">" => Ok(OperatorTag::Gt),
            "<" => Ok(OperatorTag::Lt),
            ">=" => Ok(OperatorTag::Gte),
            "<=" => Ok(OperatorTag::Lte),
            "like" => Ok(OperatorTag::Like),
            "in" => Ok(OperatorTag::In),
            _ => Err(QueryError::UnsupportedOperator(token.clone())),
        }
    }

    /// SQL text for this operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            OperatorTag::Eq => "=",
            OperatorTag::Neq => "!=",
            OperatorTag::Gt => ">",
            OperatorTag::Lt => "<",
            OperatorTag::Gte => ">=",
            OperatorTag::Lte => "<=",
            OperatorTag::Like => "LIKE",
            OperatorTag::In => "IN",
        }
    }

    /// `IN` takes a non-empty list of scalars; everything else one scalar.
    pub fn check_value(&self, value: &Value) -> QueryResult<()> {
        match self {
            OperatorTag::In => match value {
                Value::Array(items) if !items.is_empty() => {
                    if items.iter().all(is_scalar) {
                        Ok(())
                    } else {
                        Err(QueryError::InvalidFilterValue(
                            "IN filters accept only scalar values".to_string(),
                        ))
                    }
                }
                _ => Err(QueryError::InvalidFilterValue(
                    "IN filters require a non-empty list of values".to_string(),
                )),
            },
            _ if is_scalar(value) => Ok(()),
            op => Err(QueryError::InvalidFilterValue(format!(
                "{} filters require a single value",
                op.as_sql()
            ))),
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Query text plus the values its placeholders consume, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClauseFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl ClauseFragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Concatenate fragments with `separator`, keeping parameter order
    pub fn join(fragments: impl IntoIterator<Item = ClauseFragment>, separator: &str) -> Self {
        let mut sql = Vec::new();
        let mut params = Vec::new();
        for fragment in fragments {
            sql.push(fragment.sql);
            params.extend(fragment.params);
        }
        Self {
            sql: sql.join(separator),
            params,
        }
    }
}

/// Resolve `raw_operator` and render a clause for an already-validated field.
pub fn build_clause(
    field: &str,
    raw_operator: Option<&Value>,
    value: Value,
) -> QueryResult<ClauseFragment> {
    let operator = OperatorTag::parse(raw_operator)?;
    operator.check_value(&value)?;
    Ok(render_clause(field, operator, value))
}

/// Render without checking; callers must have run `check_value`.
pub(crate) fn render_clause(field: &str, operator: OperatorTag, value: Value) -> ClauseFragment {
    let column = quote(field);
    match (operator, value) {
        (OperatorTag::In, Value::Array(items)) => {
            let placeholders = vec![PLACEHOLDER; items.len()].join(", ");
            ClauseFragment {
                sql: format!("{} IN ({})", column, placeholders),
                params: items,
            }
        }
        (op, value) => ClauseFragment {
            sql: format!("{} {} {}", column, op.as_sql(), PLACEHOLDER),
            params: vec![value],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_whitelist() {
        let cases = [
            ("=", OperatorTag::Eq),
            ("!=", OperatorTag::Neq),
            (">", OperatorTag::Gt),
            ("<", OperatorTag::Lt),
            (">=", OperatorTag::Gte),
            ("<=", OperatorTag::Lte),
            (" LIKE ", OperatorTag::Like),
            ("In", OperatorTag::In),
        ];
        for (token, expected) in cases {
            assert_eq!(OperatorTag::parse(Some(&json!(token))).unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_defaults_to_eq() {
        assert_eq!(OperatorTag::parse(None).unwrap(), OperatorTag::Eq);
        assert_eq!(OperatorTag::parse(Some(&Value::Null)).unwrap(), OperatorTag::Eq);
        assert_eq!(OperatorTag::parse(Some(&json!(""))).unwrap(), OperatorTag::Eq);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for token in ["<>", "==", "; DROP TABLE x", "between", "   "] {
            assert!(matches!(
                OperatorTag::parse(Some(&json!(token))),
                Err(QueryError::UnsupportedOperator(_))
            ));
        }
        assert_eq!(
            OperatorTag::parse(Some(&json!(5))).unwrap_err(),
            QueryError::UnsupportedOperator("5".into())
        );
    }

    #[test]
    fn test_scalar_clause() {
        let clause = build_clause("age", Some(&json!(">=")), json!(18)).unwrap();
        assert_eq!(clause.sql, "`age` >= ?");
        assert_eq!(clause.params, vec![json!(18)]);
    }

    #[test]
    fn test_in_clause_expands_placeholders() {
        let clause = build_clause("status", Some(&json!("in")), json!(["Paid", "Draft", 3])).unwrap();
        assert_eq!(clause.sql, "`status` IN (?, ?, ?)");
        assert_eq!(clause.params, vec![json!("Paid"), json!("Draft"), json!(3)]);
    }

    #[test]
    fn test_in_requires_non_empty_list() {
        for value in [json!([]), json!("Paid"), Value::Null, json!([["nested"]])] {
            assert!(matches!(
                build_clause("status", Some(&json!("IN")), value),
                Err(QueryError::InvalidFilterValue(_))
            ));
        }
    }

    #[test]
    fn test_scalar_operator_rejects_list() {
        assert!(matches!(
            build_clause("status", Some(&json!("=")), json!(["a", "b"])),
            Err(QueryError::InvalidFilterValue(_))
        ));
    }

    #[test]
    fn test_join_keeps_param_order() {
        let joined = ClauseFragment::join(
            vec![
                build_clause("a", None, json!(1)).unwrap(),
                build_clause("b", Some(&json!("in")), json!([2, 3])).unwrap(),
            ],
            " AND ",
        );
        assert_eq!(joined.sql, "`a` = ? AND `b` IN (?, ?)");
        assert_eq!(joined.params, vec![json!(1), json!(2), json!(3)]);
    }
}
