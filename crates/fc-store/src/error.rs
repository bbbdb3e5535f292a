//! Error types for the store and migration engine.

use crate::validate::ForeignKeyViolation;
use thiserror::Error;

/// Store and migration engine errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open or configure the store (S001).
    #[error("[S001] Store connection failed: {0}")]
    ConnectionError(String),

    /// SQL execution error outside a migration step (S002).
    #[error("[S002] Store query failed: {0}")]
    QueryError(String),

    /// BEGIN / COMMIT / ROLLBACK failed (S003).
    #[error("[S003] Store transaction failed: {0}")]
    TransactionError(String),

    /// A DDL step could not be applied; the migration was rolled back (S004).
    #[error("[S004] Schema migration failed during {step}: {message}")]
    MigrationError { step: String, message: String },

    /// The registry declares a column SQLite cannot add to an existing table (S005).
    #[error("[S005] Cannot add column {table}.{column} to an existing table: {reason}")]
    UnsupportedAddColumn {
        table: String,
        column: String,
        reason: String,
    },

    /// Post-migration validation found declared tables missing (S006).
    #[error("[S006] Integrity check failed: declared tables missing from store: {}", .tables.join(", "))]
    MissingTables { tables: Vec<String> },

    /// Post-migration validation found rows violating foreign keys (S007).
    #[error("[S007] Integrity check failed: {}", summarize_violations(.violations))]
    ForeignKeyViolations { violations: Vec<ForeignKeyViolation> },

    /// The engine already failed in this process and will not retry (S008).
    #[error("[S008] Schema engine previously failed; restart the process after fixing the cause")]
    EngineFailed,

    /// SQLite driver error with preserved source chain (S009).
    #[error("[S009] SQLite error")]
    Sqlite(#[source] rusqlite::Error),
}

impl StoreError {
    /// Whether this error describes the data in the store (missing tables or
    /// dangling references) rather than a failure to apply structure.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingTables { .. } | StoreError::ForeignKeyViolations { .. }
        )
    }
}

/// Result type alias for [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}

fn summarize_violations(violations: &[ForeignKeyViolation]) -> String {
    match violations {
        [] => "no foreign-key violations".to_string(),
        [only] => format!("1 foreign-key violation ({only})"),
        [first, rest @ ..] => format!(
            "{} foreign-key violations (first: {first}; {} more)",
            rest.len() + 1,
            rest.len()
        ),
    }
}
