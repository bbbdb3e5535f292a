//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod history;
pub(crate) mod init;
pub(crate) mod stats;
pub(crate) mod status;
pub(crate) mod upgrade;
