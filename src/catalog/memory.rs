//! In-memory catalog for testing
//!
//! Records every executed statement and answers with canned rows projected
//! onto the selected columns. Filters, ordering and limits are not
//! interpreted.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use serde_json::Value;

use super::errors::{CatalogError, CatalogResult};
use super::{Catalog, Row};

/// A statement passed to [`Catalog::execute`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: BTreeSet<String>,
    rows: Vec<Row>,
}

/// Scripted catalog
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    /// entity -> physical table
    entities: BTreeMap<String, String>,
    tables: BTreeMap<String, MemoryTable>,
    executed: Mutex<Vec<ExecutedQuery>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity backed by a table with `columns` and `rows`.
    /// Non-object rows are ignored.
    pub fn with_table(
        mut self,
        entity: &str,
        table: &str,
        columns: &[&str],
        rows: Vec<Value>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        self.entities.insert(entity.to_string(), table.to_string());
        self.tables.insert(
            table.to_string(),
            MemoryTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    /// Register an entity whose physical table does not exist
    pub fn with_entity(mut self, entity: &str, table: &str) -> Self {
        self.entities.insert(entity.to_string(), table.to_string());
        self
    }

    /// Every statement executed so far
    pub fn executed(&self) -> Vec<ExecutedQuery> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }

    /// The most recent statement, if any
    pub fn last_executed(&self) -> Option<ExecutedQuery> {
        self.executed().pop()
    }

    fn table_for(&self, sql: &str) -> Option<&MemoryTable> {
        self.tables
            .iter()
            .find(|(name, _)| sql.contains(&format!("FROM `{}`", name)))
            .map(|(_, table)| table)
    }
}

/// Column names between `SELECT` and `FROM`, unquoted
fn selected_columns(sql: &str) -> Vec<String> {
    let Some(rest) = sql.strip_prefix("SELECT ") else {
        return Vec::new();
    };
    let list = rest.split(" FROM ").next().unwrap_or_default();
    list.split(',')
        .map(|c| c.trim().trim_matches('`').to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

impl Catalog for MemoryCatalog {
    fn exists(&self, entity: &str) -> CatalogResult<bool> {
        Ok(self.entities.contains_key(entity))
    }

    fn physical_table(&self, entity: &str) -> CatalogResult<String> {
        self.entities
            .get(entity)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEntity(entity.to_string()))
    }

    fn has_table(&self, table: &str) -> CatalogResult<bool> {
        Ok(self.tables.contains_key(table))
    }

    fn columns(&self, table: &str) -> CatalogResult<BTreeSet<String>> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> CatalogResult<Vec<Row>> {
        self.executed
            .lock()
            .map_err(|_| CatalogError::Backend("Lock poisoned".to_string()))?
            .push(ExecutedQuery {
                sql: sql.to_string(),
                params: params.to_vec(),
            });

        let Some(table) = self.table_for(sql) else {
            return Ok(Vec::new());
        };
        let selected = selected_columns(sql);

        Ok(table
            .rows
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect())
    }
}
