use super::*;
use crate::migration::MigrationEngine;
use crate::registry::canonical;
use fc_core::{DatabaseConfig, JournalMode};

#[test]
fn empty_store_has_no_tables() {
    let store = Store::open_memory().unwrap();
    let stats = row_counts(&store, canonical()).unwrap();
    assert!(stats.tables.is_empty());
    assert_eq!(stats.total_rows(), 0);
}

#[test]
fn counts_rows_in_declared_tables() {
    let store = Store::open_memory().unwrap();
    MigrationEngine::new(&store).ensure_schema_current().unwrap();
    store
        .execute(
            "INSERT INTO dealers (name, license_number) VALUES (?1, ?2), (?3, ?4)",
            rusqlite::params!["North Lot", "DL-1", "South Lot", "DL-2"],
        )
        .unwrap();

    let stats = row_counts(&store, canonical()).unwrap();
    assert_eq!(stats.tables.len(), canonical().tables().len());
    assert_eq!(stats.tables["dealers"], 2);
    assert_eq!(stats.tables["vehicles"], 0);
    // one migration record per created table
    assert_eq!(
        stats.tables["schema_migrations"],
        canonical().tables().len() as i64
    );
    assert!(stats.size_bytes > 0);
}

#[test]
fn wal_store_size_counts_uncheckpointed_pages() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: "stats.db".to_string(),
        ..DatabaseConfig::default()
    };
    assert_eq!(config.journal_mode, JournalMode::Wal);
    let store = Store::open_with(&config, dir.path()).unwrap();
    MigrationEngine::new(&store).ensure_schema_current().unwrap();

    let stats = row_counts(&store, canonical()).unwrap();
    let page_size = store
        .query_one("PRAGMA page_size", [], |row| row.get::<_, i64>(0))
        .unwrap()
        .unwrap() as u64;
    // the schema page plus at least one root page per declared table
    let floor = page_size * (1 + canonical().tables().len() as u64);
    assert!(stats.size_bytes >= floor, "{} < {floor}", stats.size_bytes);

    let main_file = std::fs::metadata(dir.path().join("stats.db")).unwrap().len();
    assert!(stats.size_bytes >= main_file);
}
