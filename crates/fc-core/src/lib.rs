//! fc-core - Core library for Forecourt
//!
//! This crate provides shared, store-independent types used across all
//! Forecourt components: configuration parsing, schema version markers,
//! strongly-typed table names, and checksums for applied DDL.

pub mod checksum;
pub mod config;
pub mod error;
pub(crate) mod serde_helpers;
pub mod table_name;
pub mod version;

pub use checksum::{compute_checksum, ddl_checksum};
pub use config::{Config, DatabaseConfig, JournalMode};
pub use error::{CoreError, CoreResult};
pub use table_name::TableName;
pub use version::SchemaVersion;
