//! The [`AttributeStore`] trait defining the storage contract for entries.
//!
//! Entries are named attribute bags living in a namespace. The contract has
//! three groups of operations:
//! - **Writes**: `store_entry` replaces an entry's whole attribute set,
//!   `update_entry` merges attributes into it, `delete_entry` removes it.
//! - **Search**: `search_entries` evaluates a [`Filter`] in one namespace.
//! - **Transactions**: nestable begin/commit/cancel.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, so the
//! host cache logic never depends on a concrete store.

use sshcache_core::{Attributes, Entry, Filter};

use crate::error::StorageError;

/// The storage contract for named attribute entries.
///
/// The trait is synchronous: every call blocks until the backend answers.
pub trait AttributeStore {
    /// Writes `attrs` as the complete attribute set of entry `name`,
    /// dropping any attribute not present in `attrs`. Creates the entry if
    /// it does not exist.
    fn store_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError>;

    /// Merges `attrs` into entry `name`: each given attribute replaces the
    /// stored values under the same name, all other stored attributes are
    /// kept. Creates the entry if it does not exist.
    fn update_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError>;

    /// Returns the entries of `namespace` matching `filter`, ordered by
    /// entry name.
    ///
    /// `wanted = None` returns every attribute; otherwise attributes are
    /// projected to the listed names. When nothing matches the backend
    /// returns [`StorageError::NoMatch`], never an empty vector.
    fn search_entries(
        &self,
        namespace: &str,
        filter: &Filter,
        wanted: Option<&[&str]>,
    ) -> Result<Vec<Entry>, StorageError>;

    /// Removes entry `name`. Removing a missing entry succeeds.
    fn delete_entry(&mut self, namespace: &str, name: &str) -> Result<(), StorageError>;

    /// Opens a transaction, or a nested level inside the current one.
    fn begin_transaction(&mut self) -> Result<(), StorageError>;

    /// Commits the innermost open transaction level.
    fn commit_transaction(&mut self) -> Result<(), StorageError>;

    /// Rolls back the innermost open transaction level.
    fn cancel_transaction(&mut self) -> Result<(), StorageError>;

    /// Number of currently open transaction levels.
    fn transaction_depth(&self) -> usize;
}
