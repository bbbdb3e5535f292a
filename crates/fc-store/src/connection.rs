//! Connection and transaction facade.
//!
//! [`Store`] owns a single SQLite [`Connection`] for the life of the process.
//! The composition root opens it once and passes it by reference to the
//! migration engine and to every service that reads or writes rows.
//!
//! Statements are always parameterized. `begin_transaction` does not arm any
//! drop guard: a caller that begins a transaction owns the matching
//! `commit` or `rollback`.

use crate::error::{StoreError, StoreResult};
use fc_core::config::{DatabaseConfig, JournalMode};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Private in-memory database, discarded when the store is dropped
    Memory,
    /// File-backed database
    File(PathBuf),
}

/// Wrapper around the process's SQLite connection.
///
/// Single-threaded: the migration phase runs to completion before anything
/// else touches the store, so no `Mutex` is needed here.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    location: StoreLocation,
}

impl Store {
    /// Open (or create) a file-backed store with default settings.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_file(path, &DatabaseConfig::default())
    }

    /// Open a store as described by `config`, resolving relative paths
    /// against `root`.
    pub fn open_with(config: &DatabaseConfig, root: &Path) -> StoreResult<Self> {
        if config.is_memory() {
            return Self::open_memory();
        }
        let path = Path::new(&config.path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        Self::open_file(&path, config)
    }

    /// Create a private in-memory store.
    ///
    /// Useful for unit tests that don't need persistence.
    pub fn open_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        apply_pragmas(&conn, None, DatabaseConfig::default().busy_timeout_ms)?;
        Ok(Self {
            conn,
            location: StoreLocation::Memory,
        })
    }

    fn open_file(path: &Path, config: &DatabaseConfig) -> StoreResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::ConnectionError(format!("{e}: {}", path.display())))?;
        apply_pragmas(&conn, Some(config.journal_mode), config.busy_timeout_ms)?;
        log::debug!("Opened store at {}", path.display());
        Ok(Self {
            conn,
            location: StoreLocation::File(path.to_path_buf()),
        })
    }

    /// Borrow the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Where this store lives.
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Execute a single statement, returning the number of rows changed.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> StoreResult<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| StoreError::QueryError(format!("{e} (statement: {sql})")))
    }

    /// Execute one or more parameterless statements (DDL, pragmas).
    pub fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| StoreError::QueryError(format!("{e} (statement: {sql})")))
    }

    /// Run a query expected to produce at most one row.
    ///
    /// Returns `Ok(None)` when the query produces no rows.
    pub fn query_one<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn
            .query_row(sql, params, map)
            .optional()
            .map_err(|e| StoreError::QueryError(format!("{e} (query: {sql})")))
    }

    /// Run a query and map every row.
    pub fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::QueryError(format!("prepare failed: {e} (query: {sql})")))?;
        let rows = stmt
            .query_map(params, map)
            .map_err(|e| StoreError::QueryError(format!("{e} (query: {sql})")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::QueryError(format!("row error: {e} (query: {sql})")))?;
        Ok(rows)
    }

    /// Open a write transaction.
    ///
    /// Uses `BEGIN IMMEDIATE` so the write lock is taken up front rather than
    /// on the first write.
    pub fn begin_transaction(&self) -> StoreResult<()> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| StoreError::TransactionError(format!("BEGIN failed: {e}")))
    }

    /// Commit the open transaction.
    pub fn commit(&self) -> StoreResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| StoreError::TransactionError(format!("COMMIT failed: {e}")))
    }

    /// Roll back the open transaction.
    pub fn rollback(&self) -> StoreResult<()> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| StoreError::TransactionError(format!("ROLLBACK failed: {e}")))
    }

    /// Whether a transaction is currently open on this connection.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

/// Apply per-connection settings. Foreign keys are off by default in SQLite
/// and must be enabled on every connection.
fn apply_pragmas(
    conn: &Connection,
    journal_mode: Option<JournalMode>,
    busy_timeout_ms: u64,
) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| StoreError::ConnectionError(format!("enable foreign keys: {e}")))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| StoreError::ConnectionError(format!("set busy timeout: {e}")))?;
    if let Some(mode) = journal_mode {
        let applied: String = conn
            .query_row(
                &format!("PRAGMA journal_mode = {}", mode.pragma_value()),
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::ConnectionError(format!("set journal mode: {e}")))?;
        if !applied.eq_ignore_ascii_case(mode.pragma_value()) {
            log::warn!("Requested journal mode {mode}, store is using {applied}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
