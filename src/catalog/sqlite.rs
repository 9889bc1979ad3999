//! SQLite-backed catalog.
//!
//! Entities resolve through an [`EntityRegistry`]; table and column
//! metadata come from `sqlite_master` and `pragma_table_info`, both queried
//! with bound parameters.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::Value;

use super::errors::{CatalogError, CatalogResult};
use super::registry::EntityRegistry;
use super::{Catalog, Row};

/// Catalog over a single SQLite database
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
    registry: EntityRegistry,
}

impl SqliteCatalog {
    /// Open (creating if needed) a database file
    pub fn open(path: impl AsRef<Path>, registry: EntityRegistry) -> CatalogResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::with_connection(conn, registry))
    }

    /// Open an existing database file without write access
    pub fn open_read_only(path: impl AsRef<Path>, registry: EntityRegistry) -> CatalogResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::with_connection(conn, registry))
    }

    /// Private in-memory database
    pub fn open_in_memory(registry: EntityRegistry) -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::with_connection(conn, registry))
    }

    pub fn with_connection(conn: Connection, registry: EntityRegistry) -> Self {
        Self {
            conn: Mutex::new(conn),
            registry,
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Run trusted setup SQL (schema creation, fixtures)
    pub fn execute_batch(&self, sql: &str) -> CatalogResult<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Backend("Lock poisoned".to_string()))
    }
}

impl Catalog for SqliteCatalog {
    fn exists(&self, entity: &str) -> CatalogResult<bool> {
        if self.registry.is_registered(entity) {
            return Ok(true);
        }
        if self.registry.convention {
            return self.has_table(&EntityRegistry::conventional_table(entity));
        }
        Ok(false)
    }

    fn physical_table(&self, entity: &str) -> CatalogResult<String> {
        self.registry
            .resolve(entity)
            .ok_or_else(|| CatalogError::UnknownEntity(entity.to_string()))
    }

    fn has_table(&self, table: &str) -> CatalogResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn columns(&self, table: &str) -> CatalogResult<BTreeSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let names = stmt.query_map([table], |row| row.get::<_, String>(0))?;

        let mut columns = BTreeSet::new();
        for name in names {
            columns.insert(name?);
        }
        Ok(columns)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> CatalogResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let bound: Vec<SqlValue> = params.iter().map(json_to_sql).collect();
        let mut rows = stmt.query(params_from_iter(bound))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                record.insert(name.clone(), sql_to_json(row.get_ref(idx)?));
            }
            results.push(record);
        }
        Ok(results)
    }
}

/// Convert a JSON value to a type that can be bound to SQLite.
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Real(f)
            } else {
                SqlValue::Text(n.to_string())
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Convert a SQLite column value back to a JSON scalar.
fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> SqliteCatalog {
        let catalog = SqliteCatalog::open_in_memory(EntityRegistry::default()).unwrap();
        catalog
            .execute_batch(
                "CREATE TABLE `tabDoctor` (name TEXT PRIMARY KEY, fee REAL, active INTEGER, modified TEXT);
                 INSERT INTO `tabDoctor` VALUES ('DR-1', 40.5, 1, '2024-01-02');
                 INSERT INTO `tabDoctor` VALUES ('DR-2', NULL, 0, '2024-01-03');",
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_metadata() {
        let catalog = catalog();
        assert!(catalog.exists("Doctor").unwrap());
        assert!(!catalog.exists("Nurse").unwrap());
        assert_eq!(catalog.physical_table("Doctor").unwrap(), "tabDoctor");
        assert!(catalog.has_table("tabDoctor").unwrap());
        assert!(!catalog.has_table("tabNurse").unwrap());

        let columns = catalog.columns("tabDoctor").unwrap();
        let expected: BTreeSet<String> = ["name", "fee", "active", "modified"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(columns, expected);
        assert!(catalog.columns("tabNurse").unwrap().is_empty());
    }

    #[test]
    fn test_execute_binds_and_converts() {
        let catalog = catalog();
        let rows = catalog
            .execute(
                "SELECT `name`, `fee`, `active` FROM `tabDoctor` WHERE `active` = ? ORDER BY `name` ASC",
                &[json!(true)],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "DR-1");
        assert_eq!(rows[0]["fee"], json!(40.5));
        assert_eq!(rows[0]["active"], json!(1));
    }

    #[test]
    fn test_execute_preserves_column_order() {
        let catalog = catalog();
        let rows = catalog
            .execute("SELECT `fee`, `name` FROM `tabDoctor` WHERE `name` = ?", &[json!("DR-2")])
            .unwrap();
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, vec!["fee", "name"]);
        assert_eq!(rows[0]["fee"], Value::Null);
    }

    #[test]
    fn test_bad_sql_is_backend_error() {
        let err = catalog().execute("SELECT nope FROM nowhere", &[]).unwrap_err();
        assert!(matches!(err, CatalogError::Backend(_)));
    }

    #[test]
    fn test_explicit_registry() {
        let catalog = SqliteCatalog::open_in_memory(
            EntityRegistry::explicit().with_entity("Queue Token", "tabQueue Token"),
        )
        .unwrap();
        assert!(catalog.exists("Queue Token").unwrap());
        assert!(!catalog.has_table("tabQueue Token").unwrap());
        assert!(matches!(
            catalog.physical_table("Doctor"),
            Err(CatalogError::UnknownEntity(_))
        ));
    }
}
