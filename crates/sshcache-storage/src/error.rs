//! Storage error types for sshcache-storage.
//!
//! [`StorageError`] covers every failure mode a backend can report:
//! driver and migration failures, the "no entry matched" search outcome,
//! transaction misuse, and resource exhaustion.

use rusqlite::ErrorCode;
use thiserror::Error;

use sshcache_core::CoreError;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite driver reported a failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored value could not be turned back into an attribute.
    #[error("attribute error: {0}")]
    Core(#[from] CoreError),

    /// A search matched no entry in the namespace.
    #[error("no entry in '{namespace}' matches {filter}")]
    NoMatch { namespace: String, filter: String },

    /// Commit or cancel was called with no open transaction.
    #[error("no transaction in progress")]
    NoTransaction,

    /// The backend ran out of memory or disk space.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A backend other than SQLite failed.
    #[error("backend failure: {reason}")]
    Backend { reason: String },
}

impl StorageError {
    /// Returns true for the "no entry matched" search outcome.
    pub fn is_no_match(&self) -> bool {
        matches!(self, StorageError::NoMatch { .. })
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::OutOfMemory) | Some(ErrorCode::DiskFull) => {
                StorageError::ResourceExhausted(err.to_string())
            }
            _ => StorageError::Sqlite(err),
        }
    }
}
