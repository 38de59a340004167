//! Scoped store transactions.
//!
//! [`TransactionGuard`] opens a transaction on construction and cancels it
//! when dropped unless [`TransactionGuard::commit`] succeeded, so every
//! early return out of a multi-step update rolls back. A failed cancel is
//! logged and never replaces the error that caused the unwind.

use std::ops::{Deref, DerefMut};

use tracing::error;

use sshcache_storage::{AttributeStore, StorageError};

/// An open store transaction, cancelled on drop unless committed.
pub struct TransactionGuard<'a, S: AttributeStore + ?Sized> {
    store: &'a mut S,
    open: bool,
}

impl<'a, S: AttributeStore + ?Sized> TransactionGuard<'a, S> {
    /// Begins a transaction on `store`.
    pub fn begin(store: &'a mut S) -> Result<Self, StorageError> {
        store.begin_transaction()?;
        Ok(TransactionGuard { store, open: true })
    }

    /// Commits the transaction. On failure the guard is dropped still open,
    /// which cancels it before the error reaches the caller.
    pub fn commit(mut self) -> Result<(), StorageError> {
        self.store.commit_transaction()?;
        self.open = false;
        Ok(())
    }
}

impl<S: AttributeStore + ?Sized> Deref for TransactionGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: AttributeStore + ?Sized> DerefMut for TransactionGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: AttributeStore + ?Sized> Drop for TransactionGuard<'_, S> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.store.cancel_transaction() {
                error!(error = %e, "could not cancel transaction");
            }
        }
    }
}
