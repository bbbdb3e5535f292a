//! Shared serde default functions for configuration structs.

/// Default SQLite database location, relative to the project directory.
pub fn default_db_path() -> String {
    "data/forecourt.db".to_string()
}

/// Default busy timeout in milliseconds.
pub fn default_busy_timeout_ms() -> u64 {
    5_000
}
