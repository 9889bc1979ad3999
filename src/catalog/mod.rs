//! # Catalog
//!
//! Schema metadata and execution for the fetch service: which entities
//! exist, which physical table backs each one, the real columns of a table,
//! and execution of the final parameterized query.

mod errors;
mod memory;
mod registry;
mod sqlite;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};

pub use errors::{CatalogError, CatalogResult};
pub use memory::{ExecutedQuery, MemoryCatalog};
pub use registry::{EntityRegistry, TABLE_PREFIX};
pub use sqlite::SqliteCatalog;

/// One result row: selected column name -> scalar value
pub type Row = Map<String, Value>;

/// Schema catalog and backing store
pub trait Catalog: Send + Sync {
    /// Whether `entity` is a known record type
    fn exists(&self, entity: &str) -> CatalogResult<bool>;

    /// Physical table backing `entity`
    fn physical_table(&self, entity: &str) -> CatalogResult<String>;

    /// Whether `table` exists in the backing store
    fn has_table(&self, table: &str) -> CatalogResult<bool>;

    /// Real column names of `table`
    fn columns(&self, table: &str) -> CatalogResult<BTreeSet<String>>;

    /// Run a parameterized read query, returning rows in store order
    fn execute(&self, sql: &str, params: &[Value]) -> CatalogResult<Vec<Row>>;
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn exists(&self, entity: &str) -> CatalogResult<bool> {
        (**self).exists(entity)
    }

    fn physical_table(&self, entity: &str) -> CatalogResult<String> {
        (**self).physical_table(entity)
    }

    fn has_table(&self, table: &str) -> CatalogResult<bool> {
        (**self).has_table(table)
    }

    fn columns(&self, table: &str) -> CatalogResult<BTreeSet<String>> {
        (**self).columns(table)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> CatalogResult<Vec<Row>> {
        (**self).execute(sql, params)
    }
}
