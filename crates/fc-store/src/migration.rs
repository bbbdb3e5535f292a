//! Self-healing schema migration engine.
//!
//! [`MigrationEngine::ensure_schema_current`] brings the live store into
//! conformance with a [`SchemaRegistry`]. It is run once by the composition
//! root before anything else uses the store:
//!
//! ```text
//! Uninitialized -> EnsuringVersionTable -> ReadingVersion -> Comparing
//!     -> (Migrating) -> Validating -> Ready | Failed
//! ```
//!
//! Migrations are additive only. Missing tables are created with every
//! declared column and foreign key; existing tables only gain the columns
//! they lack. All of it runs in one transaction that is rolled back on the
//! first failure.
//!
//! When the stored version already equals the target, the structural diff is
//! skipped and only validation runs. A store whose structure was edited by
//! hand without touching its version row is therefore not repaired until the
//! next version bump.

use crate::connection::Store;
use crate::ddl;
use crate::error::{StoreError, StoreResult};
use crate::history;
use crate::introspect::{columns_of, table_exists};
use crate::registry::{canonical, ColumnDef, SchemaRegistry, TableDef, MIGRATION_RECORD_TABLE};
use crate::validate;
use fc_core::{ddl_checksum, SchemaVersion, TableName};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;

/// Lifecycle of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    EnsuringVersionTable,
    ReadingVersion,
    Comparing,
    Migrating,
    Validating,
    /// Terminal: the store conforms and later calls are no-ops
    Ready,
    /// Terminal: the process must not go on to use the store
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::EnsuringVersionTable => "ensuring version table",
            EngineState::ReadingVersion => "reading version",
            EngineState::Comparing => "comparing",
            EngineState::Migrating => "migrating",
            EngineState::Validating => "validating",
            EngineState::Ready => "ready",
            EngineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// How a successful call reached `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Stored version already matched; no structural diff was run
    UpToDate,
    /// Registry was applied and the version row rewritten
    Migrated,
    /// This engine had already reached `Ready` earlier in the process
    AlreadyReady,
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::UpToDate => write!(f, "up to date"),
            MigrationOutcome::Migrated => write!(f, "migrated"),
            MigrationOutcome::AlreadyReady => write!(f, "already ready"),
        }
    }
}

/// A column appended to an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAddition {
    pub table: TableName,
    pub column: String,
}

impl fmt::Display for ColumnAddition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// What a call to [`MigrationEngine::ensure_schema_current`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub from_version: String,
    pub to_version: String,
    pub outcome: MigrationOutcome,
    pub tables_created: Vec<TableName>,
    pub columns_added: Vec<ColumnAddition>,
    pub indexes_ensured: usize,
    /// DDL statements executed, including version-table bootstrap
    pub ddl_statements: usize,
    /// Rows appended to `schema_migrations`
    pub records_written: usize,
}

impl MigrationReport {
    fn new(from_version: String, to_version: &str, outcome: MigrationOutcome) -> Self {
        Self {
            from_version,
            to_version: to_version.to_string(),
            outcome,
            tables_created: Vec::new(),
            columns_added: Vec::new(),
            indexes_ensured: 0,
            ddl_statements: 0,
            records_written: 0,
        }
    }

    /// Whether this call changed the store's structure.
    pub fn changed_structure(&self) -> bool {
        !self.tables_created.is_empty() || !self.columns_added.is_empty()
    }
}

/// One structural change the engine would make against the current store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannedChange {
    CreateTable(&'static TableDef),
    AddColumn {
        table: &'static TableDef,
        column: &'static ColumnDef,
    },
}

impl fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedChange::CreateTable(table) => write!(f, "create table {}", table.name),
            PlannedChange::AddColumn { table, column } => {
                write!(f, "add column {}.{}", table.name, column.name)
            }
        }
    }
}

/// Structural diff between `registry` and the live store, in registry order.
///
/// Read-only. Missing tables yield one `CreateTable`; existing tables yield
/// one `AddColumn` per declared column they lack, in declaration order.
/// Columns the store has but the registry doesn't declare are ignored.
pub fn plan(store: &Store, registry: &SchemaRegistry) -> StoreResult<Vec<PlannedChange>> {
    let mut changes = Vec::new();
    for table in registry.tables() {
        if !table_exists(store, table.name)? {
            changes.push(PlannedChange::CreateTable(table));
            continue;
        }
        let observed = columns_of(store, table.name)?;
        changes.extend(
            observed
                .missing_from(table)
                .into_iter()
                .map(|column| PlannedChange::AddColumn { table, column }),
        );
    }
    Ok(changes)
}

/// Drives one store to the registry's target version.
///
/// Holds its state in a `Cell`: the engine is used from a single thread
/// during startup and callers only need a shared reference.
pub struct MigrationEngine<'a> {
    store: &'a Store,
    registry: &'a SchemaRegistry,
    state: Cell<EngineState>,
}

impl<'a> MigrationEngine<'a> {
    /// Engine targeting the canonical registry.
    pub fn new(store: &'a Store) -> Self {
        Self::with_registry(store, canonical())
    }

    pub fn with_registry(store: &'a Store, registry: &'a SchemaRegistry) -> Self {
        Self {
            store,
            registry,
            state: Cell::new(EngineState::Uninitialized),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    pub fn target_version(&self) -> &'static str {
        self.registry.version()
    }

    /// Stored version, without migrating.
    pub fn current_version(&self) -> StoreResult<String> {
        history::current_version(self.store)
    }

    /// Bring the store to the target version and validate it.
    ///
    /// The first call does the work. After success every call returns an
    /// `AlreadyReady` report without touching the store; after failure every
    /// call returns [`StoreError::EngineFailed`].
    pub fn ensure_schema_current(&self) -> StoreResult<MigrationReport> {
        match self.state.get() {
            EngineState::Ready => {
                let target = self.target_version();
                return Ok(MigrationReport::new(
                    target.to_string(),
                    target,
                    MigrationOutcome::AlreadyReady,
                ));
            }
            EngineState::Failed => return Err(StoreError::EngineFailed),
            _ => {}
        }

        match self.run() {
            Ok(report) => {
                self.transition(EngineState::Ready);
                Ok(report)
            }
            Err(err) => {
                log::error!("Schema migration aborted while {}: {err}", self.state.get());
                self.transition(EngineState::Failed);
                Err(err)
            }
        }
    }

    fn transition(&self, next: EngineState) {
        log::debug!("Schema engine: {} -> {next}", self.state.get());
        self.state.set(next);
    }

    fn run(&self) -> StoreResult<MigrationReport> {
        let target = self.target_version();

        self.transition(EngineState::EnsuringVersionTable);
        let bootstrap_ddl = history::ensure_version_table(self.store)?;

        self.transition(EngineState::ReadingVersion);
        let current = history::current_version(self.store)?;

        self.transition(EngineState::Comparing);
        let mut report = if current == target {
            log::info!("Schema is current at version {target}");
            MigrationReport::new(current, target, MigrationOutcome::UpToDate)
        } else {
            warn_if_newer(&current, target);
            log::info!("Migrating schema from {current} to {target}");
            self.transition(EngineState::Migrating);
            let mut report = MigrationReport::new(current, target, MigrationOutcome::Migrated);
            self.migrate(&mut report)?;
            report
        };
        report.ddl_statements += bootstrap_ddl;

        self.transition(EngineState::Validating);
        validate::validate(self.store, self.registry)?.into_result()?;

        Ok(report)
    }

    /// Apply the registry in one transaction; roll back on any failure.
    fn migrate(&self, report: &mut MigrationReport) -> StoreResult<()> {
        self.store.begin_transaction()?;

        if let Err(err) = self.apply_registry(report) {
            if let Err(rollback_err) = self.store.rollback() {
                log::error!("Rollback after failed migration also failed: {rollback_err}");
            }
            return Err(err);
        }

        if let Err(commit_err) = self.store.commit() {
            if let Err(rollback_err) = self.store.rollback() {
                log::error!("Rollback after failed commit also failed: {rollback_err}");
            }
            return Err(commit_err);
        }
        Ok(())
    }

    fn apply_registry(&self, report: &mut MigrationReport) -> StoreResult<()> {
        let changes = plan(self.store, self.registry)?;
        let mut changed_tables: Vec<(&'static TableDef, String)> = Vec::new();

        for change in &changes {
            match *change {
                PlannedChange::CreateTable(table) => {
                    let sql = ddl::render_create_table(table, false);
                    self.apply_ddl(change.to_string(), &sql, report)?;
                    report.tables_created.push(TableName::new(table.name));
                    changed_tables.push((table, format!("create table {}", table.name)));
                }
                PlannedChange::AddColumn { table, column } => {
                    let sql = ddl::render_add_column(table, column)?;
                    self.apply_ddl(change.to_string(), &sql, report)?;
                    report.columns_added.push(ColumnAddition {
                        table: TableName::new(table.name),
                        column: column.name.to_string(),
                    });
                    match changed_tables.last_mut() {
                        Some((last, description)) if last.name == table.name => {
                            description.push_str(&format!(", {}", column.name));
                        }
                        _ => changed_tables
                            .push((table, format!("add columns to {}: {}", table.name, column.name))),
                    }
                }
            }
        }

        if !report.tables_created.is_empty() {
            log::info!(
                "Created {} table(s): {}",
                report.tables_created.len(),
                join_display(&report.tables_created)
            );
        }
        if !report.columns_added.is_empty() {
            log::info!(
                "Added {} column(s): {}",
                report.columns_added.len(),
                join_display(&report.columns_added)
            );
        }

        for table in self.registry.tables() {
            for index in table.indexes {
                let sql = ddl::render_create_index(table, index);
                self.apply_ddl(format!("create index {}", index.name), &sql, report)?;
                report.indexes_ensured += 1;
            }
        }
        log::info!("Ensured {} index(es)", report.indexes_ensured);

        if self.registry.contains(MIGRATION_RECORD_TABLE) {
            for (table, description) in &changed_tables {
                let checksum = ddl_checksum(&ddl::render_create_table(table, false));
                history::record_migration(self.store, table.name, description, &checksum)
                    .map_err(|e| StoreError::MigrationError {
                        step: format!("record migration for {}", table.name),
                        message: e.to_string(),
                    })?;
                report.records_written += 1;
            }
        }

        history::upsert_version(self.store, self.target_version(), self.registry.description())
            .map_err(|e| StoreError::MigrationError {
                step: "record schema version".to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    fn apply_ddl(&self, step: String, sql: &str, report: &mut MigrationReport) -> StoreResult<()> {
        log::debug!("{step}: {sql}");
        self.store
            .conn()
            .execute_batch(sql)
            .map_err(|e| StoreError::MigrationError {
                step,
                message: e.to_string(),
            })?;
        report.ddl_statements += 1;
        Ok(())
    }
}

/// Log when the stored version is newer than the target or unparseable. The
/// additive pass still runs in both cases.
fn warn_if_newer(current: &str, target: &str) {
    match (SchemaVersion::parse(current), SchemaVersion::parse(target)) {
        (Ok(stored), Ok(wanted)) if stored > wanted => log::warn!(
            "Stored schema version {stored} is newer than this binary's {wanted}; \
             applying additive changes only"
        ),
        (Err(e), _) => log::warn!("Stored schema version is unreadable: {e}"),
        _ => {}
    }
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
