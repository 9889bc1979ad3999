//! # Ad-hoc Query Pipeline
//!
//! raw request → filter / sort / pagination normalization → assembly
//! against the catalog → one parameterized `SELECT` → rows.
//!
//! Every identifier reaching query text has passed the identifier pattern
//! and, for columns, the table's column whitelist. Every caller value
//! reaches the store only as a bound parameter.

mod assembler;
mod errors;
mod fields;
mod filter;
mod identifier;
mod input;
mod operator;
mod pagination;
mod sort;

pub use assembler::{AssembledQuery, FetchRequest, QueryService, MODIFIED_COLUMN};
pub use errors::{QueryError, QueryResult};
pub use fields::{normalize_fields, select_columns, ColumnSelection, IDENTIFIER_COLUMN};
pub use filter::{normalize_filters, FilterSet, FilterTriple};
pub use identifier::{validate_column, validate_entity, validate_identifier, IdentifierKind};
pub use input::{Decoded, RawInput};
pub use operator::{build_clause, ClauseFragment, OperatorTag, PLACEHOLDER};
pub use pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};
pub use sort::{normalize_order_by, Direction, SortKey, SortSpec};
