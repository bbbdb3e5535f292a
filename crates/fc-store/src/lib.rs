//! fc-store - SQLite store for Forecourt
//!
//! Owns the dealer records database: the canonical schema registry, the
//! self-healing migration engine that brings any prior version of the store
//! up to that schema, and the integrity checks that gate startup.
//!
//! The composition root opens one [`Store`], runs
//! [`MigrationEngine::ensure_schema_current`] once, and only then hands the
//! store to anything else.

pub mod connection;
pub mod ddl;
pub mod error;
pub mod history;
pub mod introspect;
pub mod migration;
pub mod registry;
pub mod stats;
pub mod validate;

pub use connection::{Store, StoreLocation};
pub use error::{StoreError, StoreResult};
pub use history::{current_version, MigrationRecord, VersionRecord};
pub use migration::{EngineState, MigrationEngine, MigrationOutcome, MigrationReport};
pub use registry::{canonical, SchemaRegistry, TARGET_SCHEMA_VERSION};
pub use stats::{row_counts, StoreStats};
pub use validate::{validate, IntegrityReport};

use fc_core::DatabaseConfig;
use std::path::Path;

/// Open the configured store and bring it to the canonical schema.
pub fn open_and_migrate(
    config: &DatabaseConfig,
    root: &Path,
) -> StoreResult<(Store, MigrationReport)> {
    let store = Store::open_with(config, root)?;
    let report = MigrationEngine::new(&store).ensure_schema_current()?;
    Ok((store, report))
}
