//! The upsert protocol: create or replace a host record, merging in an alias.
//!
//! Without an alias the record is written with one full-replace store call.
//! With an alias the read of the existing record, the merge and the write
//! run inside one transaction so concurrent alias additions to the same
//! host cannot overwrite each other.

use tracing::{debug, warn};

use sshcache_core::Attributes;
use sshcache_storage::AttributeStore;

use crate::alias::{merge_aliases, HostAttrs};
use crate::error::{HostCacheError, StoreOp};
use crate::names::{ATTR_NAME_ALIAS, SSH_HOSTS_NAMESPACE};
use crate::query::lookup_host;
use crate::txn::TransactionGuard;

fn write_host<S>(store: &mut S, name: &str, attrs: &Attributes) -> Result<(), HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    debug!(host = name, "updating host");
    store
        .store_entry(SSH_HOSTS_NAMESPACE, name, attrs)
        .map_err(|e| {
            warn!(host = name, error = %e, "error storing host");
            HostCacheError::store(StoreOp::Write, name, e)
        })
}

/// Creates or fully replaces the identity attributes of host `name`.
///
/// `payload` carries caller data (public keys and the like) and may not set
/// `objectClass`, `name` or `nameAlias`. The written record gets the SSH
/// host object class, `name`, and `lastUpdate = now`. When `alias` is given
/// the stored aliases are carried over and `alias` is added unless already
/// present; without an alias any stored aliases are dropped.
pub fn store_host<S>(
    store: &mut S,
    name: &str,
    alias: Option<&str>,
    now: i64,
    payload: Attributes,
) -> Result<(), HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    debug!(host = name, alias, now, "storing host");
    let builder = HostAttrs::new(name, payload)?;

    let Some(alias) = alias else {
        let attrs = builder.stamped(now)?;
        return write_host(store, name, &attrs);
    };

    let mut tx = TransactionGuard::begin(store).map_err(|source| {
        warn!(host = name, error = %source, "failed to start transaction");
        HostCacheError::TransactionBegin {
            name: name.to_string(),
            source,
        }
    })?;

    let existing = lookup_host(&*tx, name, Some(&[ATTR_NAME_ALIAS]), StoreOp::Read)?;
    let merge = merge_aliases(name, existing.as_ref(), alias);
    if !merge.added {
        debug!(host = name, alias, "alias already recorded");
    }

    let attrs = builder.with_aliases(&merge)?.stamped(now)?;
    write_host(&mut *tx, name, &attrs)?;

    tx.commit().map_err(|source| {
        warn!(host = name, error = %source, "failed to commit transaction");
        HostCacheError::Commit {
            name: name.to_string(),
            source,
        }
    })
}
