//! Entity registry: entity name -> physical table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::query::validate_entity;

/// Prefix of conventionally named entity tables (`Invoice` -> `tabInvoice`)
pub const TABLE_PREFIX: &str = "tab";

/// Maps entity names to physical tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistry {
    /// Resolve unregistered entities to `tab{Entity}` (default: true)
    #[serde(default = "default_convention")]
    pub convention: bool,

    /// Explicit entity -> table mappings
    #[serde(default)]
    pub entities: BTreeMap<String, String>,
}

fn default_convention() -> bool {
    true
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self {
            convention: default_convention(),
            entities: BTreeMap::new(),
        }
    }
}

impl EntityRegistry {
    /// Registry with only explicit mappings
    pub fn explicit() -> Self {
        Self {
            convention: false,
            entities: BTreeMap::new(),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>, table: impl Into<String>) -> Self {
        self.entities.insert(entity.into(), table.into());
        self
    }

    pub fn is_registered(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Conventional table name for `entity`
    pub fn conventional_table(entity: &str) -> String {
        format!("{}{}", TABLE_PREFIX, entity)
    }

    /// Physical table for `entity`, if any
    pub fn resolve(&self, entity: &str) -> Option<String> {
        match self.entities.get(entity) {
            Some(table) => Some(table.clone()),
            None if self.convention => Some(Self::conventional_table(entity)),
            None => None,
        }
    }

    /// Every entity and table name must pass the entity identifier pattern.
    pub fn validate(&self) -> Result<(), String> {
        for (entity, table) in &self.entities {
            validate_entity(entity).map_err(|e| e.to_string())?;
            validate_entity(table).map_err(|e| format!("table for {}: {}", entity, e))?;
        }
        Ok(())
    }
}
