//! Init command implementation - creates a new store at the current schema

use anyhow::{Context, Result};
use fc_core::Config;
use fc_store::{canonical, row_counts, MigrationEngine};
use std::fs;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::{self, format_bytes};
use crate::commands::upgrade::print_report;

/// Execute the init command
pub(crate) fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let mut deployment = common::load_deployment(global)?;

    if deployment.config_path.is_none() {
        if let Some(name) = &args.name {
            deployment.config.name = name.clone();
        }
        deployment.config.validate().context("Invalid configuration")?;
        write_config(&deployment.root, &deployment.config)?;
    }

    if let Some(path) = deployment.database_path() {
        if path.exists() && !args.force {
            anyhow::bail!(
                "Database {} already exists. Use `forecourt upgrade` to migrate it, \
                 or pass --force to run init anyway.",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    println!(
        "Initializing {} at {}\n",
        deployment.config.name,
        deployment.database_display()
    );

    let store = deployment.open_store()?;
    let report = MigrationEngine::new(&store)
        .ensure_schema_current()
        .context("Schema migration failed")?;
    print_report(&report);

    let stats = row_counts(&store, canonical()).context("Failed to collect statistics")?;
    println!(
        "\n{} tables, {} rows, {}",
        stats.tables.len(),
        stats.total_rows(),
        format_bytes(stats.size_bytes)
    );

    Ok(())
}

fn write_config(root: &std::path::Path, config: &Config) -> Result<()> {
    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create directory: {}", root.display()))?;
    let path = root.join("forecourt.yml");
    let yaml = config.to_yaml().context("Failed to serialize configuration")?;
    fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
