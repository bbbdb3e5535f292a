use super::*;

#[test]
fn current_version_without_table_is_initial() {
    let store = Store::open_memory().unwrap();
    assert_eq!(current_version(&store).unwrap(), INITIAL_VERSION);
    assert!(!table_exists(&store, VERSION_TABLE).unwrap());
}

#[test]
fn ensure_version_table_runs_ddl_once() {
    let store = Store::open_memory().unwrap();
    assert_eq!(ensure_version_table(&store).unwrap(), 2);
    assert_eq!(ensure_version_table(&store).unwrap(), 0);
    assert_eq!(current_version(&store).unwrap(), INITIAL_VERSION);
}

#[test]
fn ensure_version_table_restores_missing_unique_index() {
    let store = Store::open_memory().unwrap();
    store
        .execute_batch(&ddl::render_create_table(&VERSION_TABLE_DEF, false))
        .unwrap();
    assert!(!index_exists(&store, "idx_schema_version_version").unwrap());

    assert_eq!(ensure_version_table(&store).unwrap(), 1);
    assert!(index_exists(&store, "idx_schema_version_version").unwrap());
    assert_eq!(ensure_version_table(&store).unwrap(), 0);

    upsert_version(&store, "1.1.0", "after repair").unwrap();
    upsert_version(&store, "1.1.0", "after repair").unwrap();
    assert_eq!(version_history(&store).unwrap().len(), 1);
}

#[test]
fn latest_applied_version_wins() {
    let store = Store::open_memory().unwrap();
    ensure_version_table(&store).unwrap();
    store
        .execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2), (?3, ?4)",
            rusqlite::params![
                "1.1.0",
                "2026-01-02T00:00:00.000000Z",
                "1.0.0",
                "2025-06-01T00:00:00.000000Z"
            ],
        )
        .unwrap();
    assert_eq!(current_version(&store).unwrap(), "1.1.0");

    let history = version_history(&store).unwrap();
    let versions: Vec<&str> = history.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, ["1.1.0", "1.0.0"]);
}

#[test]
fn upsert_does_not_duplicate_version_rows() {
    let store = Store::open_memory().unwrap();
    ensure_version_table(&store).unwrap();
    upsert_version(&store, "1.1.0", "first").unwrap();
    upsert_version(&store, "1.1.0", "second").unwrap();

    let history = version_history(&store).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].description.as_deref(), Some("second"));
}

#[test]
fn version_string_is_unique() {
    let store = Store::open_memory().unwrap();
    ensure_version_table(&store).unwrap();
    store
        .execute(
            "INSERT INTO schema_version (version, applied_at) VALUES ('1.0.0', 'x')",
            [],
        )
        .unwrap();
    assert!(store
        .execute(
            "INSERT INTO schema_version (version, applied_at) VALUES ('1.0.0', 'y')",
            [],
        )
        .is_err());
}

#[test]
fn migration_history_empty_without_table() {
    let store = Store::open_memory().unwrap();
    assert!(migration_history(&store).unwrap().is_empty());
}

#[test]
fn timestamps_sort_lexically() {
    let a = timestamp_now();
    let b = timestamp_now();
    assert_eq!(a.len(), b.len());
    assert!(a <= b);
}
