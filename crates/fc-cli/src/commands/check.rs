//! Check command implementation - integrity checks without migrating

use anyhow::{Context, Result};
use fc_store::{canonical, validate, IntegrityReport};
use serde::Serialize;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{self, print_table, ExitCode};

#[derive(Debug, Serialize)]
struct CheckOutput {
    ok: bool,
    registry_problems: Vec<String>,
    #[serde(flatten)]
    integrity: IntegrityReport,
}

/// Execute the check command
pub(crate) fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let deployment = common::load_deployment(global)?;
    let store = deployment.open_existing_store()?;

    let registry_problems = canonical().lint();
    let integrity = validate(&store, canonical()).context("Failed to run integrity checks")?;
    let output = CheckOutput {
        ok: registry_problems.is_empty() && integrity.is_ok(),
        registry_problems,
        integrity,
    };

    if args.json {
        common::print_json(&output)?;
    } else {
        print_human(&output);
    }

    if output.ok {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_human(output: &CheckOutput) {
    for problem in &output.registry_problems {
        println!("registry: {problem}");
    }

    let missing = &output.integrity.tables.missing;
    if missing.is_empty() {
        println!("All declared tables present.");
    } else {
        println!("Missing tables ({}):", missing.len());
        for table in missing {
            println!("  {table}");
        }
    }

    let violations = &output.integrity.violations;
    if violations.is_empty() {
        println!("No foreign-key violations.");
    } else {
        println!("\nForeign-key violations ({}):", violations.len());
        let rows: Vec<Vec<String>> = violations
            .iter()
            .map(|v| {
                vec![
                    v.table.to_string(),
                    v.rowid.map(|r| r.to_string()).unwrap_or_default(),
                    v.column.clone().unwrap_or_default(),
                    v.parent.to_string(),
                ]
            })
            .collect();
        print_table(&["TABLE", "ROWID", "COLUMN", "PARENT"], &rows);
    }

    println!();
    println!("{}", if output.ok { "Check passed." } else { "Check failed." });
}
