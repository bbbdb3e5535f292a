//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use fc_core::{Config, CoreError};
use fc_store::Store;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A resolved deployment: where it lives and how it is configured.
#[derive(Debug)]
pub(crate) struct Deployment {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
    /// Config file the settings came from, if any
    pub(crate) config_path: Option<PathBuf>,
}

impl Deployment {
    /// Absolute database path, or `None` for an in-memory store.
    pub(crate) fn database_path(&self) -> Option<PathBuf> {
        self.config.database_path_absolute(&self.root)
    }

    /// Human-readable database location.
    pub(crate) fn database_display(&self) -> String {
        match self.database_path() {
            Some(path) => path.display().to_string(),
            None => self.config.database.path.clone(),
        }
    }

    /// Open the store, creating the file if needed.
    pub(crate) fn open_store(&self) -> Result<Store> {
        Store::open_with(&self.config.database, &self.root)
            .with_context(|| format!("Failed to open database {}", self.database_display()))
    }

    /// Open a store that must already exist.
    ///
    /// Commands that only read never create an empty database file as a
    /// side effect.
    pub(crate) fn open_existing_store(&self) -> Result<Store> {
        if let Some(path) = self.database_path() {
            if !path.exists() {
                anyhow::bail!(
                    "Database not found at {}. Run `forecourt init` first.",
                    path.display()
                );
            }
        }
        self.open_store()
    }
}

/// Resolve configuration from the global flags.
///
/// An explicit `--config` must exist. Otherwise `forecourt.yml` in the
/// project directory is used when present, and defaults when it isn't.
/// `--database` overrides the configured path in every case.
pub(crate) fn load_deployment(global: &GlobalArgs) -> Result<Deployment> {
    let root = global.project_dir.clone();

    let (mut config, config_path) = match &global.config {
        Some(path) => (
            Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
            Some(path.clone()),
        ),
        None => match Config::load_from_dir(&root) {
            Ok(config) => (config, find_config_file(&root)),
            Err(CoreError::ConfigNotFound { .. }) => {
                log::debug!(
                    "No forecourt.yml in {}; using default settings",
                    root.display()
                );
                (Config::with_name(default_name(&root)), None)
            }
            Err(e) => return Err(e).context("Failed to load configuration"),
        },
    };

    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    config.validate().context("Invalid configuration")?;

    Ok(Deployment {
        root,
        config,
        config_path,
    })
}

fn find_config_file(root: &Path) -> Option<PathBuf> {
    ["forecourt.yml", "forecourt.yaml"]
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
}

/// Deployment name derived from the directory name.
pub(crate) fn default_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "forecourt".to_string())
}

/// Print a value as pretty JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Calculate column widths for a table given headers and rows.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Columns are left-aligned and separated by two spaces, with a dashed line
/// under the header row.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

/// Format a byte count with a binary unit suffix.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
