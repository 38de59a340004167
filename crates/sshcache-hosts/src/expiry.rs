//! Known-hosts expiry stamping.

use tracing::{debug, warn};

use sshcache_core::Attributes;
use sshcache_storage::AttributeStore;

use crate::error::{HostCacheError, StoreOp};
use crate::names::{ATTR_KNOWN_HOSTS_EXPIRE, ATTR_NAME, SSH_HOSTS_NAMESPACE};

/// Sets `sshKnownHostsExpire = now + timeout` on host `name`.
///
/// Only the expiry attribute is written; aliases, keys and other stored
/// attributes are kept. A negative timeout yields an already expired
/// record, which is how callers invalidate a host immediately. The store
/// creates the entry if it does not exist; `name` is written alongside the
/// expiry so such an entry is still found by [`get_host`].
///
/// [`get_host`]: crate::query::get_host
pub fn refresh_expiry<S>(
    store: &mut S,
    name: &str,
    now: i64,
    timeout: i64,
) -> Result<(), HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    if name.is_empty() {
        return Err(HostCacheError::InvalidRequest(
            "host name must not be empty".into(),
        ));
    }
    let expire = now.saturating_add(timeout);
    debug!(host = name, expire, "updating known_hosts expire time");

    let mut attrs = Attributes::new();
    attrs.add_string(ATTR_NAME, name)?;
    attrs.add_int(ATTR_KNOWN_HOSTS_EXPIRE, expire)?;
    store
        .update_entry(SSH_HOSTS_NAMESPACE, name, &attrs)
        .map_err(|e| {
            warn!(host = name, error = %e, "could not set known_hosts expire time");
            HostCacheError::store(StoreOp::Write, name, e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{get_host, get_host_record, list_valid_host_records, list_valid_hosts};
    use crate::upsert::store_host;
    use sshcache_storage::{InMemoryStore, SqliteStore};

    #[test]
    fn refresh_preserves_identity_data() {
        let mut store = InMemoryStore::new();
        let mut payload = Attributes::new();
        payload.add_string("sshPublicKey", "k1").unwrap();
        store_host(&mut store, "h", Some("a1"), 100, payload).unwrap();

        refresh_expiry(&mut store, "h", 100, 180).unwrap();

        let record = get_host_record(&store, "h").unwrap().unwrap();
        assert_eq!(record.known_hosts_expire, Some(280));
        assert_eq!(record.aliases, vec!["a1"]);
        assert_eq!(record.last_update, Some(100));
        assert_eq!(record.public_keys().count(), 1);
    }

    #[test]
    fn negative_timeout_expires_immediately() {
        let mut store = InMemoryStore::new();
        store_host(&mut store, "h", None, 500, Attributes::new()).unwrap();
        refresh_expiry(&mut store, "h", 500, -100).unwrap();

        let record = get_host_record(&store, "h").unwrap().unwrap();
        assert_eq!(record.known_hosts_expire, Some(400));
        assert!(list_valid_hosts(&store, 500, None).unwrap().is_empty());
    }

    #[test]
    fn refresh_overflow_saturates() {
        let mut store = InMemoryStore::new();
        store_host(&mut store, "h", None, 0, Attributes::new()).unwrap();
        refresh_expiry(&mut store, "h", i64::MAX - 1, 10).unwrap();
        let record = get_host_record(&store, "h").unwrap().unwrap();
        assert_eq!(record.known_hosts_expire, Some(i64::MAX));
    }

    fn refresh_creates_a_findable_host<S: AttributeStore>(mut store: S) {
        refresh_expiry(&mut store, "new", 0, 10).unwrap();

        let entry = get_host(&store, "new", None).unwrap().unwrap();
        assert_eq!(entry.name, "new");

        let listed = list_valid_host_records(&store, 5).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "new");
        assert_eq!(listed[0].known_hosts_expire, Some(10));
    }

    #[test]
    fn refresh_of_unknown_host_creates_it() {
        refresh_creates_a_findable_host(InMemoryStore::new());
        refresh_creates_a_findable_host(SqliteStore::in_memory().unwrap());
    }
}
