//! Error taxonomy for host cache operations.
//!
//! Every call reports exactly one [`HostCacheError`]. Store failures keep the
//! underlying [`StorageError`] as their source and say which step failed, so
//! callers can tell "nothing was attempted" (transaction begin) from
//! "attempted, not committed" (read/write) from "attempted, outcome unknown"
//! (commit).

use std::fmt;

use thiserror::Error;

use sshcache_core::CoreError;
use sshcache_storage::StorageError;

/// The store primitive that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Looking up the existing record during an alias merge.
    Read,
    /// Writing the record or its expiry.
    Write,
    /// A get or list query.
    Search,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            StoreOp::Read => "read",
            StoreOp::Write => "write",
            StoreOp::Search => "search",
            StoreOp::Delete => "delete",
        };
        f.write_str(op)
    }
}

/// Errors produced by host cache operations.
#[derive(Debug, Error)]
pub enum HostCacheError {
    /// The request violates an input constraint; the store was not touched.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The attribute model rejected a value.
    #[error("attribute error: {0}")]
    Attribute(#[from] CoreError),

    /// The store ran out of memory or disk space.
    #[error("resource exhausted during {op} of host '{name}'")]
    ResourceExhausted {
        op: StoreOp,
        name: String,
        #[source]
        source: StorageError,
    },

    /// More than one record carries the same primary name.
    #[error("found {count} hosts named '{name}'")]
    ConsistencyViolation { name: String, count: usize },

    /// The transaction could not be opened; nothing was read or written.
    #[error("failed to start transaction for host '{name}'")]
    TransactionBegin {
        name: String,
        #[source]
        source: StorageError,
    },

    /// A store primitive failed. Inside a transaction, the transaction was
    /// cancelled before this error was returned.
    #[error("store {op} failed for host '{name}'")]
    Store {
        op: StoreOp,
        name: String,
        #[source]
        source: StorageError,
    },

    /// Commit failed after the write went through; the outcome is unknown.
    #[error("failed to commit transaction for host '{name}'")]
    Commit {
        name: String,
        #[source]
        source: StorageError,
    },
}

impl HostCacheError {
    /// Classifies a failed store primitive.
    pub(crate) fn store(op: StoreOp, name: &str, source: StorageError) -> Self {
        match source {
            StorageError::ResourceExhausted(_) => HostCacheError::ResourceExhausted {
                op,
                name: name.to_string(),
                source,
            },
            source => HostCacheError::Store {
                op,
                name: name.to_string(),
                source,
            },
        }
    }

    /// True when the store may or may not have applied the change. Only a
    /// commit failure leaves the outcome undetermined; callers should retry
    /// the whole operation.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, HostCacheError::Commit { .. })
    }

    /// True for duplicate primary names in the store.
    pub fn is_consistency_violation(&self) -> bool {
        matches!(self, HostCacheError::ConsistencyViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_exhaustion_is_classified_separately() {
        let err = HostCacheError::store(
            StoreOp::Write,
            "web01",
            StorageError::ResourceExhausted("disk full".into()),
        );
        assert!(matches!(err, HostCacheError::ResourceExhausted { .. }));

        let err = HostCacheError::store(StoreOp::Write, "web01", StorageError::NoTransaction);
        assert!(matches!(
            err,
            HostCacheError::Store {
                op: StoreOp::Write,
                ..
            }
        ));
        assert!(!err.is_indeterminate());
    }

    #[test]
    fn only_commit_failures_are_indeterminate() {
        let err = HostCacheError::Commit {
            name: "web01".into(),
            source: StorageError::Backend {
                reason: "busy".into(),
            },
        };
        assert!(err.is_indeterminate());
        assert_eq!(
            err.to_string(),
            "failed to commit transaction for host 'web01'"
        );
    }

    #[test]
    fn messages_name_the_step() {
        let err = HostCacheError::store(StoreOp::Delete, "web01", StorageError::NoTransaction);
        assert_eq!(err.to_string(), "store delete failed for host 'web01'");
    }
}
