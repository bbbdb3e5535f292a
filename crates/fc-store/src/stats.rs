//! Read-only row counts for operational reporting.

use crate::connection::Store;
use crate::ddl::quote_ident;
use crate::error::StoreResult;
use crate::introspect::table_exists;
use crate::registry::SchemaRegistry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Row counts per registry table plus the store's size on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Only tables that exist are listed
    pub tables: BTreeMap<String, i64>,
    pub size_bytes: u64,
}

impl StoreStats {
    pub fn total_rows(&self) -> i64 {
        self.tables.values().sum()
    }
}

/// Count rows in every registry table that exists and measure the store.
///
/// Size is `page_count * page_size` as seen by this connection, so pages
/// still sitting in a WAL file are counted.
pub fn row_counts(store: &Store, registry: &SchemaRegistry) -> StoreResult<StoreStats> {
    let mut tables = BTreeMap::new();
    for name in registry.all_table_names() {
        if !table_exists(store, name)? {
            continue;
        }
        // Identifiers can't be bound as parameters; names come from the
        // compiled-in registry.
        let count = store
            .query_one(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
                [],
                |row| row.get::<_, i64>(0),
            )?
            .unwrap_or(0);
        tables.insert(name.to_string(), count);
    }

    Ok(StoreStats {
        tables,
        size_bytes: size_bytes(store)?,
    })
}

fn size_bytes(store: &Store) -> StoreResult<u64> {
    let pages = store
        .query_one(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
            [],
            |row| row.get::<_, i64>(0),
        )?
        .unwrap_or(0);
    Ok(u64::try_from(pages).unwrap_or(0))
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
