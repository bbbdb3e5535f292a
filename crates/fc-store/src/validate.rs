//! Post-migration integrity validation.
//!
//! The final gate before the store is declared usable: every declared table
//! must exist, and every row must satisfy its foreign keys. Failure here is
//! always fatal at startup.

use crate::connection::Store;
use crate::error::{StoreError, StoreResult};
use crate::history::VERSION_TABLE;
use crate::introspect::table_exists;
use crate::registry::SchemaRegistry;
use fc_core::TableName;
use serde::Serialize;
use std::fmt;

/// Result of checking that every declared table exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCheck {
    pub missing: Vec<TableName>,
}

impl TableCheck {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }
}

/// One row that references a parent row that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyViolation {
    /// Child table holding the dangling reference
    pub table: TableName,
    /// Rowid of the offending row (`None` for WITHOUT ROWID tables)
    pub rowid: Option<i64>,
    /// Referencing column(s), comma-separated for composite keys
    pub column: Option<String>,
    /// Table the row should reference
    pub parent: TableName,
}

impl fmt::Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(rowid) = self.rowid {
            write!(f, " rowid {rowid}")?;
        }
        if let Some(column) = &self.column {
            write!(f, " column {column}")?;
        }
        write!(f, " -> {}", self.parent)
    }
}

/// Combined outcome of both checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub tables: TableCheck,
    pub violations: Vec<ForeignKeyViolation>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.tables.is_ok() && self.violations.is_empty()
    }

    /// Convert a failing report into the matching error. Missing tables are
    /// reported ahead of foreign-key violations.
    pub fn into_result(self) -> StoreResult<()> {
        if !self.tables.is_ok() {
            return Err(StoreError::MissingTables {
                tables: self
                    .tables
                    .missing
                    .into_iter()
                    .map(TableName::into_inner)
                    .collect(),
            });
        }
        if !self.violations.is_empty() {
            return Err(StoreError::ForeignKeyViolations {
                violations: self.violations,
            });
        }
        Ok(())
    }
}

/// Confirm the version table and every registry table exist.
pub fn all_declared_tables_exist(
    store: &Store,
    registry: &SchemaRegistry,
) -> StoreResult<TableCheck> {
    let mut missing = Vec::new();
    let declared = std::iter::once(VERSION_TABLE).chain(registry.tables().iter().map(|t| t.name));
    for name in declared {
        if !table_exists(store, name)? {
            missing.push(TableName::new(name));
        }
    }
    Ok(TableCheck { missing })
}

/// Run SQLite's native foreign-key check over the whole store.
pub fn foreign_keys_consistent(store: &Store) -> StoreResult<Vec<ForeignKeyViolation>> {
    let raw = store.query_all("PRAGMA foreign_key_check", [], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut violations = Vec::with_capacity(raw.len());
    for (table, rowid, parent, fk_id) in raw {
        let column = store
            .query_one(
                "SELECT group_concat(\"from\", ', ') FROM pragma_foreign_key_list(?1) WHERE id = ?2",
                rusqlite::params![table, fk_id],
                |row| row.get::<_, Option<String>>(0),
            )?
            .flatten();
        violations.push(ForeignKeyViolation {
            table: TableName::new(table),
            rowid,
            column,
            parent: TableName::new(parent),
        });
    }
    Ok(violations)
}

/// Run both checks.
pub fn validate(store: &Store, registry: &SchemaRegistry) -> StoreResult<IntegrityReport> {
    Ok(IntegrityReport {
        tables: all_declared_tables_exist(store, registry)?,
        violations: foreign_keys_consistent(store)?,
    })
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
