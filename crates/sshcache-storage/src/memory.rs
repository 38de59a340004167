//! In-memory implementation of [`AttributeStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests, ephemeral caches,
//! and anywhere persistence isn't needed. It keeps entries in a BTreeMap
//! with identical semantics to the SQLite backend.

use std::collections::BTreeMap;

use sshcache_core::{Attributes, Entry, Filter};

use crate::error::StorageError;
use crate::traits::AttributeStore;

type EntryKey = (String, String);

/// In-memory implementation of [`AttributeStore`].
///
/// Transactions are snapshots: beginning a level pushes a copy of every
/// entry, cancelling restores it and committing drops it.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: BTreeMap<EntryKey, Attributes>,
    snapshots: Vec<BTreeMap<EntryKey, Attributes>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            entries: BTreeMap::new(),
            snapshots: Vec::new(),
        }
    }

    /// Number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(namespace: &str, name: &str) -> EntryKey {
        (namespace.to_string(), name.to_string())
    }
}

impl AttributeStore for InMemoryStore {
    fn store_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        self.entries
            .insert(Self::key(namespace, name), attrs.clone());
        Ok(())
    }

    fn update_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        self.entries
            .entry(Self::key(namespace, name))
            .or_default()
            .merge_from(attrs);
        Ok(())
    }

    fn search_entries(
        &self,
        namespace: &str,
        filter: &Filter,
        wanted: Option<&[&str]>,
    ) -> Result<Vec<Entry>, StorageError> {
        let found: Vec<Entry> = self
            .entries
            .iter()
            .filter(|((ns, _), attrs)| ns == namespace && filter.matches(attrs))
            .map(|((_, name), attrs)| {
                let attributes = match wanted {
                    Some(wanted) => attrs.project(wanted),
                    None => attrs.clone(),
                };
                Entry::new(name.clone(), attributes)
            })
            .collect();

        if found.is_empty() {
            return Err(StorageError::NoMatch {
                namespace: namespace.to_string(),
                filter: filter.to_string(),
            });
        }
        Ok(found)
    }

    fn delete_entry(&mut self, namespace: &str, name: &str) -> Result<(), StorageError> {
        self.entries.remove(&Self::key(namespace, name));
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        self.snapshots.push(self.entries.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), StorageError> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or(StorageError::NoTransaction)
    }

    fn cancel_transaction(&mut self) -> Result<(), StorageError> {
        let snapshot = self.snapshots.pop().ok_or(StorageError::NoTransaction)?;
        self.entries = snapshot;
        Ok(())
    }

    fn transaction_depth(&self) -> usize {
        self.snapshots.len()
    }
}
