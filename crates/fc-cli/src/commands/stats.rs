//! Stats command implementation

use anyhow::{Context, Result};
use fc_store::{canonical, row_counts};

use crate::cli::{GlobalArgs, StatsArgs};
use crate::commands::common::{self, format_bytes, print_table};

/// Execute the stats command
pub(crate) fn execute(args: &StatsArgs, global: &GlobalArgs) -> Result<()> {
    let deployment = common::load_deployment(global)?;
    let store = deployment.open_existing_store()?;
    let stats = row_counts(&store, canonical()).context("Failed to collect statistics")?;

    if args.json {
        return common::print_json(&stats);
    }

    let rows: Vec<Vec<String>> = stats
        .tables
        .iter()
        .map(|(table, count)| vec![table.clone(), count.to_string()])
        .collect();
    print_table(&["TABLE", "ROWS"], &rows);
    println!(
        "\n{} rows total, {}",
        stats.total_rows(),
        format_bytes(stats.size_bytes)
    );
    Ok(())
}
