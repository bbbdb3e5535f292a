//! Upgrade command implementation

use anyhow::{Context, Result};
use fc_store::migration::{plan, MigrationOutcome, MigrationReport};
use fc_store::{canonical, current_version, MigrationEngine, TARGET_SCHEMA_VERSION};

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common;

/// Execute the upgrade command
pub(crate) fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let deployment = common::load_deployment(global)?;
    let store = deployment.open_existing_store()?;

    let current = current_version(&store).context("Failed to read schema version")?;
    println!("Schema version: {current} -> {TARGET_SCHEMA_VERSION}");

    if args.dry_run {
        if current == TARGET_SCHEMA_VERSION {
            println!("Up to date; nothing to apply.");
            return Ok(());
        }
        let changes = plan(&store, canonical()).context("Failed to compute schema diff")?;
        if changes.is_empty() {
            println!("No structural changes pending; the version row would be updated.");
        } else {
            println!("Pending changes:");
            for change in &changes {
                println!("  {change}");
            }
        }
        return Ok(());
    }

    let report = MigrationEngine::new(&store)
        .ensure_schema_current()
        .context("Schema migration failed")?;
    println!();
    print_report(&report);
    Ok(())
}

/// Print a migration report in human-readable form.
pub(crate) fn print_report(report: &MigrationReport) {
    match report.outcome {
        MigrationOutcome::Migrated => {
            println!(
                "Migrated schema {} -> {}",
                report.from_version, report.to_version
            );
            for table in &report.tables_created {
                println!("  + table  {table}");
            }
            for column in &report.columns_added {
                println!("  + column {column}");
            }
            println!(
                "  {} indexes ensured, {} DDL statements, {} migration records",
                report.indexes_ensured, report.ddl_statements, report.records_written
            );
        }
        MigrationOutcome::UpToDate | MigrationOutcome::AlreadyReady => {
            println!("Schema is up to date at {}", report.to_version);
        }
    }
    println!("Integrity check passed.");
}
