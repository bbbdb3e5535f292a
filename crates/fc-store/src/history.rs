//! Schema version bookkeeping and migration history.
//!
//! `schema_version` holds one row per version the store has been migrated
//! to; the current version is the row with the latest `applied_at`.
//! `schema_migrations` holds one row per structural change (table created or
//! widened). Both are written only by the migration engine during startup.

use crate::connection::Store;
use crate::ddl;
use crate::error::{StoreError, StoreResult};
use crate::introspect::{index_exists, table_exists};
use crate::registry::{ColumnDef, IndexDef, SqlType, TableDef, MIGRATION_RECORD_TABLE};
use fc_core::TableName;
use serde::Serialize;

/// Version-tracking table name.
pub const VERSION_TABLE: &str = "schema_version";

/// Version reported for a store that has never been migrated.
pub const INITIAL_VERSION: &str = "0.0.0";

static VERSION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("version", SqlType::Text).not_null(),
    ColumnDef::new("applied_at", SqlType::Text).not_null(),
    ColumnDef::new("description", SqlType::Text),
];

static VERSION_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_schema_version_version",
    columns: &["version"],
    unique: true,
}];

/// Definition of the version-tracking table. Not part of any registry's
/// iteration: the engine creates it before reading the current version.
pub static VERSION_TABLE_DEF: TableDef = TableDef {
    name: VERSION_TABLE,
    description: "Schema versions applied to this store",
    columns: VERSION_COLUMNS,
    indexes: VERSION_INDEXES,
    foreign_keys: &[],
};

/// One row of `schema_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: String,
    pub applied_at: String,
    pub description: Option<String>,
}

/// One row of `schema_migrations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    pub id: i64,
    pub table_name: TableName,
    pub applied_at: String,
    pub description: Option<String>,
    pub checksum: String,
}

/// Current UTC time as RFC 3339 with microseconds. Fixed width, so text
/// order matches time order.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}

/// Create the version table and its unique index if absent.
///
/// Table and index are checked separately: a bootstrap interrupted between
/// the two statements leaves the table without the index that
/// [`upsert_version`] relies on. Returns the number of DDL statements
/// executed (zero when both already exist).
pub(crate) fn ensure_version_table(store: &Store) -> StoreResult<usize> {
    let mut executed = 0;

    if !table_exists(store, VERSION_TABLE)? {
        let sql = ddl::render_create_table(&VERSION_TABLE_DEF, true);
        store
            .execute_batch(&sql)
            .map_err(|e| StoreError::MigrationError {
                step: format!("create table {VERSION_TABLE}"),
                message: e.to_string(),
            })?;
        log::info!("Created version table {VERSION_TABLE}");
        executed += 1;
    }

    for index in VERSION_TABLE_DEF.indexes {
        if index_exists(store, index.name)? {
            continue;
        }
        let sql = ddl::render_create_index(&VERSION_TABLE_DEF, index);
        store
            .execute_batch(&sql)
            .map_err(|e| StoreError::MigrationError {
                step: format!("create index {}", index.name),
                message: e.to_string(),
            })?;
        log::debug!("Created index {}", index.name);
        executed += 1;
    }

    Ok(executed)
}

/// Most recently applied version, or [`INITIAL_VERSION`] when the version
/// table is absent or empty. Never migrates.
pub fn current_version(store: &Store) -> StoreResult<String> {
    if !table_exists(store, VERSION_TABLE)? {
        return Ok(INITIAL_VERSION.to_string());
    }
    let version = store.query_one(
        "SELECT version FROM schema_version ORDER BY applied_at DESC, rowid DESC LIMIT 1",
        [],
        |row| row.get::<_, String>(0),
    )?;
    Ok(version.unwrap_or_else(|| INITIAL_VERSION.to_string()))
}

/// Record `version` as applied now. Re-recording an existing version moves
/// its timestamp forward instead of adding a duplicate row.
pub(crate) fn upsert_version(store: &Store, version: &str, description: &str) -> StoreResult<()> {
    store.execute(
        "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)
         ON CONFLICT(version) DO UPDATE SET
             applied_at = excluded.applied_at,
             description = excluded.description",
        rusqlite::params![version, timestamp_now(), description],
    )?;
    Ok(())
}

/// Append one migration record.
pub(crate) fn record_migration(
    store: &Store,
    table: &str,
    description: &str,
    checksum: &str,
) -> StoreResult<i64> {
    store.execute(
        "INSERT INTO schema_migrations (table_name, applied_at, description, checksum)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![table, timestamp_now(), description, checksum],
    )?;
    Ok(store.last_insert_id())
}

/// Every recorded version, newest first.
pub fn version_history(store: &Store) -> StoreResult<Vec<VersionRecord>> {
    if !table_exists(store, VERSION_TABLE)? {
        return Ok(Vec::new());
    }
    store.query_all(
        "SELECT version, applied_at, description FROM schema_version
         ORDER BY applied_at DESC, rowid DESC",
        [],
        |row| {
            Ok(VersionRecord {
                version: row.get(0)?,
                applied_at: row.get(1)?,
                description: row.get(2)?,
            })
        },
    )
}

/// Every migration record, oldest first.
pub fn migration_history(store: &Store) -> StoreResult<Vec<MigrationRecord>> {
    if !table_exists(store, MIGRATION_RECORD_TABLE)? {
        return Ok(Vec::new());
    }
    store.query_all(
        "SELECT id, table_name, applied_at, description, checksum FROM schema_migrations
         ORDER BY id",
        [],
        |row| {
            Ok(MigrationRecord {
                id: row.get(0)?,
                table_name: TableName::new(row.get::<_, String>(1)?),
                applied_at: row.get(2)?,
                description: row.get(3)?,
                checksum: row.get(4)?,
            })
        },
    )
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
