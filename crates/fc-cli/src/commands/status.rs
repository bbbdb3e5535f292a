//! Status command implementation

use anyhow::{Context, Result};
use fc_store::{current_version, TARGET_SCHEMA_VERSION};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common;

#[derive(Debug, Serialize)]
struct StatusOutput {
    name: String,
    database: String,
    current_version: String,
    target_version: &'static str,
    pending: bool,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let deployment = common::load_deployment(global)?;
    let store = deployment.open_existing_store()?;
    let current = current_version(&store).context("Failed to read schema version")?;

    let output = StatusOutput {
        name: deployment.config.name.clone(),
        database: deployment.database_display(),
        pending: current != TARGET_SCHEMA_VERSION,
        current_version: current,
        target_version: TARGET_SCHEMA_VERSION,
    };

    if args.json {
        return common::print_json(&output);
    }

    println!("Deployment:      {}", output.name);
    println!("Database:        {}", output.database);
    println!("Current version: {}", output.current_version);
    println!("Target version:  {}", output.target_version);
    if output.pending {
        println!("\nMigration pending. Run `forecourt upgrade` to apply.");
    } else {
        println!("\nSchema is up to date.");
    }
    Ok(())
}
