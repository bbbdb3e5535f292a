//! History command implementation

use anyhow::{Context, Result};
use fc_store::history::{migration_history, version_history};
use fc_store::{MigrationRecord, VersionRecord};
use serde::Serialize;

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{self, print_table};

#[derive(Debug, Serialize)]
struct HistoryOutput {
    versions: Vec<VersionRecord>,
    migrations: Vec<MigrationRecord>,
}

/// Execute the history command
pub(crate) fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let deployment = common::load_deployment(global)?;
    let store = deployment.open_existing_store()?;

    let output = HistoryOutput {
        versions: version_history(&store).context("Failed to read version history")?,
        migrations: migration_history(&store).context("Failed to read migration records")?,
    };

    if args.json {
        return common::print_json(&output);
    }

    if output.versions.is_empty() {
        println!("No schema versions recorded.");
    } else {
        let rows: Vec<Vec<String>> = output
            .versions
            .iter()
            .map(|v| {
                vec![
                    v.version.clone(),
                    v.applied_at.clone(),
                    v.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["VERSION", "APPLIED AT", "DESCRIPTION"], &rows);
    }

    if !output.migrations.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = output
            .migrations
            .iter()
            .map(|m| {
                vec![
                    m.id.to_string(),
                    m.table_name.to_string(),
                    m.applied_at.clone(),
                    m.description.clone().unwrap_or_default(),
                    m.checksum.chars().take(12).collect(),
                ]
            })
            .collect();
        print_table(&["ID", "TABLE", "APPLIED AT", "DESCRIPTION", "CHECKSUM"], &rows);
    }
    Ok(())
}
