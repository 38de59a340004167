//! Host removal.

use tracing::debug;

use sshcache_storage::AttributeStore;

use crate::error::{HostCacheError, StoreOp};
use crate::names::SSH_HOSTS_NAMESPACE;

/// Deletes host `name`. Whether deleting a missing host succeeds is up to
/// the store; both bundled stores treat it as success.
pub fn delete_host<S>(store: &mut S, name: &str) -> Result<(), HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    debug!(host = name, "deleting host");
    store
        .delete_entry(SSH_HOSTS_NAMESPACE, name)
        .map_err(|e| HostCacheError::store(StoreOp::Delete, name, e))
}
