//! Read-only introspection of the live store.
//!
//! These helpers answer "what structure does the store have right now?"
//! from `sqlite_master` and the table-valued pragmas. They never mutate and
//! are safe to call inside an open transaction, where they observe the
//! transaction's own uncommitted DDL.

use crate::connection::Store;
use crate::error::StoreResult;
use crate::registry::{ColumnDef, TableDef};

/// Column names currently present on one table, in table order.
///
/// Recomputed on every call; never cached across migration runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedColumns {
    names: Vec<String>,
}

impl ObservedColumns {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Declared columns absent from this table, in declaration order.
    ///
    /// Additive only: columns present here but not declared are ignored.
    pub fn missing_from<'t>(&self, table: &'t TableDef) -> Vec<&'t ColumnDef> {
        table
            .columns
            .iter()
            .filter(|col| !self.contains(col.name))
            .collect()
    }
}

/// Whether a table named `name` exists.
pub fn table_exists(store: &Store, name: &str) -> StoreResult<bool> {
    schema_object_exists(store, "table", name)
}

/// Whether an index named `name` exists.
pub fn index_exists(store: &Store, name: &str) -> StoreResult<bool> {
    schema_object_exists(store, "index", name)
}

fn schema_object_exists(store: &Store, kind: &str, name: &str) -> StoreResult<bool> {
    let exists = store.query_one(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2)",
        rusqlite::params![kind, name],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists.unwrap_or(false))
}

/// Columns currently present on `table`.
///
/// Returns an empty set for a table that does not exist. Uses
/// `table_xinfo` rather than `table_info` so generated columns are seen.
pub fn columns_of(store: &Store, table: &str) -> StoreResult<ObservedColumns> {
    let names = store.query_all(
        "SELECT name FROM pragma_table_xinfo(?1)",
        rusqlite::params![table],
        |row| row.get::<_, String>(0),
    )?;
    Ok(ObservedColumns { names })
}

/// All user tables, sorted by name.
pub fn list_tables(store: &Store) -> StoreResult<Vec<String>> {
    store.query_all(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
        [],
        |row| row.get::<_, String>(0),
    )
}

#[cfg(test)]
#[path = "introspect_test.rs"]
mod tests;
