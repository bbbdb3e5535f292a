use super::*;
use crate::history::{migration_history, version_history, INITIAL_VERSION, VERSION_TABLE};
use crate::introspect::index_exists;
use crate::registry::{canonical, IndexDef, SqlType, TARGET_SCHEMA_VERSION};

static WIDGETS_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", SqlType::Integer).autoincrement(),
    ColumnDef::new("label", SqlType::Text).not_null(),
];

static WIDGETS_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_widgets_label",
    columns: &["label"],
    unique: false,
}];

static BROKEN_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", SqlType::Integer).autoincrement(),
    ColumnDef::new("amount", SqlType::Real).check("amount >"),
];

static BROKEN_TABLES: &[TableDef] = &[
    TableDef {
        name: "widgets",
        description: "",
        columns: WIDGETS_COLUMNS,
        indexes: WIDGETS_INDEXES,
        foreign_keys: &[],
    },
    TableDef {
        name: "broken",
        description: "",
        columns: BROKEN_COLUMNS,
        indexes: &[],
        foreign_keys: &[],
    },
];

static BROKEN: SchemaRegistry = SchemaRegistry::new("9.9.9", "broken", BROKEN_TABLES);

static UNIQUE_LATE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", SqlType::Integer).autoincrement(),
    ColumnDef::new("label", SqlType::Text),
    ColumnDef::new("code", SqlType::Text).unique(),
];

static UNIQUE_LATE_TABLES: &[TableDef] = &[TableDef {
    name: "widgets",
    description: "",
    columns: UNIQUE_LATE_COLUMNS,
    indexes: &[],
    foreign_keys: &[],
}];

static UNIQUE_LATE: SchemaRegistry = SchemaRegistry::new("2.0.0", "", UNIQUE_LATE_TABLES);

#[test]
fn fresh_store_reaches_ready() {
    let store = Store::open_memory().unwrap();
    let engine = MigrationEngine::new(&store);
    assert_eq!(engine.state(), EngineState::Uninitialized);

    let report = engine.ensure_schema_current().unwrap();
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(report.outcome, MigrationOutcome::Migrated);
    assert_eq!(report.from_version, INITIAL_VERSION);
    assert_eq!(report.to_version, TARGET_SCHEMA_VERSION);
    assert_eq!(report.tables_created.len(), canonical().tables().len());
    assert!(report.columns_added.is_empty());
    assert_eq!(
        report.indexes_ensured,
        canonical()
            .tables()
            .iter()
            .map(|t| t.indexes.len())
            .sum::<usize>()
    );
    assert_eq!(engine.current_version().unwrap(), TARGET_SCHEMA_VERSION);
}

#[test]
fn ready_engine_is_a_no_op() {
    let store = Store::open_memory().unwrap();
    let engine = MigrationEngine::new(&store);
    engine.ensure_schema_current().unwrap();
    store.execute_batch("DROP TABLE sales").unwrap();

    let report = engine.ensure_schema_current().unwrap();
    assert_eq!(report.outcome, MigrationOutcome::AlreadyReady);
    assert_eq!(report.ddl_statements, 0);
    assert_eq!(engine.state(), EngineState::Ready);
}

#[test]
fn second_engine_takes_fast_path() {
    let store = Store::open_memory().unwrap();
    MigrationEngine::new(&store).ensure_schema_current().unwrap();

    let engine = MigrationEngine::new(&store);
    let report = engine.ensure_schema_current().unwrap();
    assert_eq!(report.outcome, MigrationOutcome::UpToDate);
    assert_eq!(report.ddl_statements, 0);
    assert_eq!(report.records_written, 0);
    assert!(!report.changed_structure());
}

#[test]
fn plan_on_empty_store_creates_every_table() {
    let store = Store::open_memory().unwrap();
    let changes = plan(&store, canonical()).unwrap();
    let rendered: Vec<String> = changes.iter().map(|c| c.to_string()).collect();
    let expected: Vec<String> = canonical()
        .all_table_names()
        .iter()
        .map(|name| format!("create table {name}"))
        .collect();
    assert_eq!(rendered, expected);
}

#[test]
fn plan_ignores_undeclared_columns() {
    let store = Store::open_memory().unwrap();
    store
        .execute_batch("CREATE TABLE widgets (id INTEGER PRIMARY KEY, legacy TEXT)")
        .unwrap();
    let changes = plan(&store, &BROKEN).unwrap();
    let rendered: Vec<String> = changes.iter().map(|c| c.to_string()).collect();
    assert_eq!(rendered, ["add column widgets.label", "create table broken"]);
}

#[test]
fn failed_migration_rolls_back_and_poisons_engine() {
    let store = Store::open_memory().unwrap();
    let engine = MigrationEngine::with_registry(&store, &BROKEN);

    let err = engine.ensure_schema_current().unwrap_err();
    assert!(
        matches!(err, StoreError::MigrationError { ref step, .. } if step == "create table broken"),
        "{err}"
    );
    assert_eq!(engine.state(), EngineState::Failed);
    assert!(!store.in_transaction());

    // The table created before the failure is gone; the version table is
    // bootstrapped outside the migration transaction and stays.
    assert!(!table_exists(&store, "widgets").unwrap());
    assert!(table_exists(&store, VERSION_TABLE).unwrap());
    assert_eq!(engine.current_version().unwrap(), INITIAL_VERSION);

    assert!(matches!(
        engine.ensure_schema_current(),
        Err(StoreError::EngineFailed)
    ));
}

#[test]
fn unsupported_column_is_rejected_before_any_change_sticks() {
    let store = Store::open_memory().unwrap();
    store
        .execute_batch("CREATE TABLE widgets (id INTEGER PRIMARY KEY AUTOINCREMENT)")
        .unwrap();
    let engine = MigrationEngine::with_registry(&store, &UNIQUE_LATE);

    let err = engine.ensure_schema_current().unwrap_err();
    assert!(matches!(
        err,
        StoreError::UnsupportedAddColumn { ref column, .. } if column == "code"
    ));
    // `label` was added before `code` failed and must have been rolled back
    assert!(!columns_of(&store, "widgets").unwrap().contains("label"));
}

#[test]
fn migration_records_one_row_per_changed_table() {
    let store = Store::open_memory().unwrap();
    let report = MigrationEngine::new(&store).ensure_schema_current().unwrap();

    let records = migration_history(&store).unwrap();
    assert_eq!(records.len(), report.records_written);
    assert_eq!(records.len(), canonical().tables().len());
    assert_eq!(records[0].table_name, MIGRATION_RECORD_TABLE);
    assert_eq!(records[3].description.as_deref(), Some("create table vehicles"));

    let vehicles = canonical().definition("vehicles");
    assert_eq!(
        records[3].checksum,
        ddl_checksum(&ddl::render_create_table(vehicles, false))
    );
}

#[test]
fn widened_table_record_lists_added_columns() {
    let store = Store::open_memory().unwrap();
    let engine = MigrationEngine::new(&store);
    engine.ensure_schema_current().unwrap();

    // Simulate an older vehicles table by rebuilding it without 1.1.0 columns
    store
        .execute_batch(
            "PRAGMA foreign_keys = OFF;
             DROP TABLE vehicles;
             CREATE TABLE vehicles (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 dealer_id INTEGER NOT NULL REFERENCES dealers(id),
                 vin TEXT NOT NULL UNIQUE, make TEXT NOT NULL, model TEXT NOT NULL,
                 year INTEGER NOT NULL, mileage INTEGER NOT NULL DEFAULT 0,
                 price REAL NOT NULL, cost REAL NOT NULL DEFAULT 0.0,
                 status TEXT NOT NULL DEFAULT 'available',
                 created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             );
             PRAGMA foreign_keys = ON;
             UPDATE schema_version SET version = '1.0.0';",
        )
        .unwrap();

    let report = MigrationEngine::new(&store).ensure_schema_current().unwrap();
    assert_eq!(report.from_version, "1.0.0");
    assert!(report.tables_created.is_empty());
    let added: Vec<String> = report.columns_added.iter().map(|c| c.to_string()).collect();
    assert_eq!(added, ["vehicles.condition", "vehicles.display_name"]);

    let last = migration_history(&store).unwrap().pop().unwrap();
    assert_eq!(last.table_name, "vehicles");
    assert_eq!(
        last.description.as_deref(),
        Some("add columns to vehicles: condition, display_name")
    );
    assert!(index_exists(&store, "idx_vehicles_status").unwrap());
}

#[test]
fn newer_stored_version_is_rewritten_to_target() {
    let store = Store::open_memory().unwrap();
    MigrationEngine::new(&store).ensure_schema_current().unwrap();
    store
        .execute_batch("UPDATE schema_version SET version = '9.0.0'")
        .unwrap();

    let report = MigrationEngine::new(&store).ensure_schema_current().unwrap();
    assert_eq!(report.from_version, "9.0.0");
    assert_eq!(report.outcome, MigrationOutcome::Migrated);
    assert!(!report.changed_structure());
    assert_eq!(
        history::current_version(&store).unwrap(),
        TARGET_SCHEMA_VERSION
    );
    assert_eq!(version_history(&store).unwrap().len(), 2);
}

#[test]
fn half_bootstrapped_version_table_still_migrates() {
    let store = Store::open_memory().unwrap();
    store
        .execute_batch(&ddl::render_create_table(&history::VERSION_TABLE_DEF, false))
        .unwrap();

    let report = MigrationEngine::new(&store).ensure_schema_current().unwrap();
    assert_eq!(report.outcome, MigrationOutcome::Migrated);
    assert_eq!(history::current_version(&store).unwrap(), TARGET_SCHEMA_VERSION);

    let again = MigrationEngine::new(&store).ensure_schema_current().unwrap();
    assert_eq!(again.outcome, MigrationOutcome::UpToDate);
    assert_eq!(again.ddl_statements, 0);
}
