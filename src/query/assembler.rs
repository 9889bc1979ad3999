//! # Query Assembler
//!
//! Resolves the entity through the catalog, whitelists every identifier,
//! and assembles one parameterized single-table `SELECT`.
//!
//! Soft failures (empty/unknown entity, missing table, unknown requested
//! columns) are logged and degrade to an empty or narrower result. Hard
//! failures are returned as [`QueryError`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogError, Row};
use crate::observability::{Event, Logger};

use super::errors::{QueryError, QueryResult};
use super::fields::{normalize_fields, select_columns};
use super::filter::{normalize_filters, FilterSet};
use super::identifier::{quote, validate_entity};
use super::input::RawInput;
use super::pagination::Pagination;
use super::sort::{normalize_order_by, Direction, SortKey, SortSpec};

/// Last-modified timestamp column used for the default ordering
pub const MODIFIED_COLUMN: &str = "modified";

/// One fetch call, as received
///
/// Bodies must be JSON objects; positional (array) bodies are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct FetchRequest {
    /// Entity name; empty means "nothing to fetch"
    pub entity: String,
    pub fields: RawInput,
    pub filters: RawInput,
    pub order_by: RawInput,
    pub limit: RawInput,
    /// Offset
    pub start: RawInput,
}

#[derive(Deserialize)]
struct RequestBody {
    #[serde(default, alias = "doctype")]
    entity: String,

    #[serde(default)]
    fields: RawInput,

    #[serde(default)]
    filters: RawInput,

    #[serde(default)]
    order_by: RawInput,

    #[serde(default)]
    limit: RawInput,

    #[serde(default)]
    start: RawInput,
}

impl TryFrom<Map<String, Value>> for FetchRequest {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let body: RequestBody = serde_json::from_value(Value::Object(object))?;
        Ok(Self {
            entity: body.entity,
            fields: body.fields,
            filters: body.filters,
            order_by: body.order_by,
            limit: body.limit,
            start: body.start,
        })
    }
}

impl FetchRequest {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Default::default()
        }
    }

    pub fn fields(mut self, fields: impl Into<RawInput>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn filters(mut self, filters: impl Into<RawInput>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn order_by(mut self, order_by: impl Into<RawInput>) -> Self {
        self.order_by = order_by.into();
        self
    }

    pub fn limit(mut self, limit: impl Into<RawInput>) -> Self {
        self.limit = limit.into();
        self
    }

    pub fn start(mut self, start: impl Into<RawInput>) -> Self {
        self.start = start.into();
        self
    }

    /// Build from URL query parameters; every value is text.
    pub fn from_query_params(params: &HashMap<String, String>) -> Self {
        let text = |key: &str| RawInput::from(params.get(key).cloned());
        let entity = params
            .get("entity")
            .or_else(|| params.get("doctype"))
            .cloned()
            .unwrap_or_default();

        Self {
            entity,
            fields: text("fields"),
            filters: text("filters"),
            order_by: text("order_by"),
            limit: text("limit"),
            start: text("start"),
        }
    }
}

/// A fully validated query, ready to execute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledQuery {
    pub entity: String,
    pub table: String,
    pub columns: Vec<String>,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub pagination: Pagination,
    pub sql: String,
    pub params: Vec<Value>,
}

/// The ad-hoc fetch service
pub struct QueryService<C: Catalog> {
    catalog: C,
    logger: Logger,
}

impl<C: Catalog> QueryService<C> {
    /// Service logging to stdout
    pub fn new(catalog: C) -> Self {
        Self::with_logger(catalog, Logger::stdout())
    }

    pub fn with_logger(catalog: C, logger: Logger) -> Self {
        Self { catalog, logger }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Validate and assemble without executing.
    ///
    /// `Ok(None)` is a soft failure: the fetch would return no rows.
    pub fn plan(&self, request: &FetchRequest) -> QueryResult<Option<AssembledQuery>> {
        let request_id = Uuid::new_v4().to_string();
        self.plan_logged(request, &request_id)
    }

    /// Fetch rows for `request`.
    pub fn fetch(&self, request: &FetchRequest) -> QueryResult<Vec<Row>> {
        let request_id = Uuid::new_v4().to_string();

        let query = match self.plan_logged(request, &request_id)? {
            Some(query) => query,
            None => return Ok(Vec::new()),
        };

        match self.catalog.execute(&query.sql, &query.params) {
            Ok(rows) => {
                self.logger.log(
                    Event::FetchComplete,
                    &[
                        ("entity", query.entity.as_str()),
                        ("request_id", request_id.as_str()),
                        ("rows", rows.len().to_string().as_str()),
                    ],
                );
                Ok(rows)
            }
            Err(err) => {
                self.log_failure(&request.entity, &request_id, &QueryError::from(err.clone()));
                Err(err.into())
            }
        }
    }

    fn plan_logged(
        &self,
        request: &FetchRequest,
        request_id: &str,
    ) -> QueryResult<Option<AssembledQuery>> {
        self.assemble(request, request_id).inspect_err(|err| {
            self.log_failure(&request.entity, request_id, err);
        })
    }

    fn log_failure(&self, entity: &str, request_id: &str, err: &QueryError) {
        let event = if err.is_validation() {
            Event::FetchRejected
        } else {
            Event::FetchFailed
        };
        self.logger.log(
            event,
            &[
                ("code", err.code()),
                ("entity", entity),
                ("error", err.to_string().as_str()),
                ("request_id", request_id),
            ],
        );
    }

    fn assemble(&self, request: &FetchRequest, request_id: &str) -> QueryResult<Option<AssembledQuery>> {
        let entity = request.entity.as_str();
        if entity.is_empty() {
            return Ok(None);
        }

        let Some(table) = self.resolve_table(entity, request_id)? else {
            return Ok(None);
        };
        let columns = self.catalog.columns(&table)?;

        // Select list
        let selection = select_columns(&normalize_fields(&request.fields), &columns)?;
        for field in &selection.dropped {
            self.logger.log(
                Event::FetchInvalidColumn,
                &[("entity", entity), ("field", field.as_str()), ("request_id", request_id)],
            );
        }

        // Filters: every field must be a real column
        let filters = normalize_filters(&request.filters)?;
        if let Some(unknown) = filters.iter().find(|f| !columns.contains(&f.field)) {
            return Err(QueryError::UnknownField(unknown.field.clone()));
        }

        let sort = self.sort_for(entity, &request.order_by, &columns, request_id)?;
        let pagination = Pagination::from_raw(&request.limit, &request.start);

        let mut sql = format!("SELECT {} FROM {}", selection.to_clause(), quote(&table));
        let where_clause = filters.to_clause();
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.sql);
        }
        if !sort.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&sort.to_clause());
        }
        sql.push(' ');
        sql.push_str(&pagination.to_clause());

        Ok(Some(AssembledQuery {
            entity: entity.to_string(),
            table,
            columns: selection.columns,
            filters,
            sort,
            pagination,
            sql,
            params: where_clause.params,
        }))
    }

    /// Physical table for `entity`, or `None` after logging why there is none.
    fn resolve_table(&self, entity: &str, request_id: &str) -> QueryResult<Option<String>> {
        if validate_entity(entity).is_err() {
            self.logger.log(
                Event::FetchInvalidEntity,
                &[("entity", entity), ("request_id", request_id)],
            );
            return Ok(None);
        }

        let missing_entity = || -> QueryResult<Option<String>> {
            self.logger.log(
                Event::FetchMissingEntity,
                &[("entity", entity), ("request_id", request_id)],
            );
            Ok(None)
        };

        if !self.catalog.exists(entity)? {
            return missing_entity();
        }
        let table = match self.catalog.physical_table(entity) {
            Ok(table) => table,
            Err(CatalogError::UnknownEntity(_)) => return missing_entity(),
            Err(err) => return Err(err.into()),
        };

        // Table names come from the catalog, but are embedded literally.
        if validate_entity(&table).is_err() {
            return Err(CatalogError::InvalidTable(table).into());
        }

        if !self.catalog.has_table(&table)? {
            self.logger.log(
                Event::FetchMissingTable,
                &[("entity", entity), ("request_id", request_id), ("table", table.as_str())],
            );
            return Ok(None);
        }

        Ok(Some(table))
    }

    /// Caller ordering restricted to real columns, else `modified DESC`
    /// when the table has that column.
    fn sort_for(
        &self,
        entity: &str,
        order_by: &RawInput,
        columns: &BTreeSet<String>,
        request_id: &str,
    ) -> QueryResult<SortSpec> {
        let mut sort = normalize_order_by(order_by)?;
        sort.keys.retain(|key| {
            let known = columns.contains(&key.field);
            if !known {
                self.logger.log(
                    Event::FetchInvalidSortColumn,
                    &[("entity", entity), ("field", key.field.as_str()), ("request_id", request_id)],
                );
            }
            known
        });

        if sort.is_empty() && columns.contains(MODIFIED_COLUMN) {
            sort.keys.push(SortKey::new(MODIFIED_COLUMN, Direction::Desc));
        }
        Ok(sort)
    }
}
