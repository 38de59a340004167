//! CLI error type and its mapping to process exit codes.

use thiserror::Error;

use sshcache_core::CoreError;
use sshcache_hosts::HostCacheError;
use sshcache_storage::StorageError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("host '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Host(#[from] HostCacheError),

    #[error(transparent)]
    Attribute(#[from] CoreError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code: 0 = success, 1 = request error or not found,
    /// 2 = consistency violation, 3 = store or I/O error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_)
            | CliError::NotFound(_)
            | CliError::Attribute(_) => 1,
            CliError::Host(HostCacheError::InvalidRequest(_))
            | CliError::Host(HostCacheError::Attribute(_)) => 1,
            CliError::Host(HostCacheError::ConsistencyViolation { .. }) => 2,
            CliError::Host(_) | CliError::Open { .. } | CliError::Json(_) | CliError::Io(_) => 3,
        }
    }
}
