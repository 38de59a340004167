//! Shared helpers for host cache integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use sshcache_core::{Attributes, Entry, Filter};
use sshcache_storage::{AttributeStore, InMemoryStore, SqliteStore, StorageError};

/// A store primitive that [`FaultyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Begin,
    Search,
    /// Fails before anything is written.
    Store,
    /// Performs the write, then reports failure.
    StoreAfterWrite,
    Update,
    Delete,
    /// Reports failure without committing, leaving the transaction open.
    Commit,
    /// Rolls back, then reports failure anyway.
    Cancel,
}

/// Wraps a real store, injecting failures and recording every call.
pub struct FaultyStore<S> {
    pub inner: S,
    pub faults: Vec<Fault>,
    /// Return every search result twice, as a corrupted store would.
    pub duplicate_search: bool,
    /// Report injected failures as resource exhaustion.
    pub exhausted: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl<S: AttributeStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            faults: Vec::new(),
            duplicate_search: false,
            exhausted: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str, fault: Fault) -> Result<(), StorageError> {
        self.calls.borrow_mut().push(call);
        if self.faults.contains(&fault) {
            return Err(self.injected(call));
        }
        Ok(())
    }

    fn injected(&self, call: &str) -> StorageError {
        if self.exhausted {
            return StorageError::ResourceExhausted(format!("injected {} failure", call));
        }
        StorageError::Backend {
            reason: format!("injected {} failure", call),
        }
    }
}

impl<S: AttributeStore> AttributeStore for FaultyStore<S> {
    fn store_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        self.record("store", Fault::Store)?;
        self.inner.store_entry(namespace, name, attrs)?;
        if self.faults.contains(&Fault::StoreAfterWrite) {
            return Err(self.injected("store"));
        }
        Ok(())
    }

    fn update_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        self.record("update", Fault::Update)?;
        self.inner.update_entry(namespace, name, attrs)
    }

    fn search_entries(
        &self,
        namespace: &str,
        filter: &Filter,
        wanted: Option<&[&str]>,
    ) -> Result<Vec<Entry>, StorageError> {
        self.record("search", Fault::Search)?;
        let found = self.inner.search_entries(namespace, filter, wanted)?;
        if self.duplicate_search {
            return Ok(found.iter().chain(found.iter()).cloned().collect());
        }
        Ok(found)
    }

    fn delete_entry(&mut self, namespace: &str, name: &str) -> Result<(), StorageError> {
        self.record("delete", Fault::Delete)?;
        self.inner.delete_entry(namespace, name)
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        self.record("begin", Fault::Begin)?;
        self.inner.begin_transaction()
    }

    fn commit_transaction(&mut self) -> Result<(), StorageError> {
        self.record("commit", Fault::Commit)?;
        self.inner.commit_transaction()
    }

    fn cancel_transaction(&mut self) -> Result<(), StorageError> {
        self.calls.borrow_mut().push("cancel");
        self.inner.cancel_transaction()?;
        if self.faults.contains(&Fault::Cancel) {
            return Err(self.injected("cancel"));
        }
        Ok(())
    }

    fn transaction_depth(&self) -> usize {
        self.inner.transaction_depth()
    }
}

/// Every bundled backend, freshly created and labelled for assertion messages.
pub fn backends() -> Vec<(&'static str, Box<dyn AttributeStore>)> {
    vec![
        ("memory", Box::new(InMemoryStore::new())),
        (
            "sqlite",
            Box::new(SqliteStore::in_memory().expect("in-memory sqlite")),
        ),
    ]
}

pub fn key_payload(key: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.add_string("sshPublicKey", key).unwrap();
    attrs
}
