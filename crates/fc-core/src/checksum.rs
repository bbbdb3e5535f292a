//! SHA-256 checksums for migration history records.

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checksum a DDL statement with whitespace runs collapsed.
///
/// Two renderings of the same definition that differ only in indentation or
/// line breaks produce the same checksum.
pub fn ddl_checksum(ddl: &str) -> String {
    let normalized = ddl.split_whitespace().collect::<Vec<_>>().join(" ");
    compute_checksum(&normalized)
}
