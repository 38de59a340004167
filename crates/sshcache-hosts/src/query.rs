//! Host lookups: exact-name retrieval and the valid-hosts listing.
//!
//! This layer builds the filters and applies the result-count policy. The
//! store evaluates the predicates. Zero matches is never an error here: a
//! lookup reports `None`, a listing reports an empty vector. Two or more
//! entries for one primary name is a [`HostCacheError::ConsistencyViolation`].

use tracing::{debug, error};

use sshcache_core::{Entry, Filter};
use sshcache_storage::{AttributeStore, StorageError};

use crate::error::{HostCacheError, StoreOp};
use crate::names::{ATTR_KNOWN_HOSTS_EXPIRE, ATTR_NAME, SSH_HOSTS_NAMESPACE};
use crate::record::HostRecord;

/// Filter matching the record whose primary name is `name`.
pub fn name_filter(name: &str) -> Filter {
    Filter::equals(ATTR_NAME, name)
}

/// Filter matching records whose known_hosts data is valid at `now`.
pub fn valid_hosts_filter(now: i64) -> Filter {
    Filter::greater_or_equal(ATTR_KNOWN_HOSTS_EXPIRE, now)
}

/// Runs a search in the SSH hosts namespace, turning the store's "no match"
/// outcome into an empty vector.
fn search_hosts<S>(
    store: &S,
    filter: &Filter,
    wanted: Option<&[&str]>,
    op: StoreOp,
    subject: &str,
) -> Result<Vec<Entry>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    match store.search_entries(SSH_HOSTS_NAMESPACE, filter, wanted) {
        Ok(entries) => Ok(entries),
        Err(StorageError::NoMatch { .. }) => {
            debug!(%filter, "no such host");
            Ok(Vec::new())
        }
        Err(e) => {
            error!(%filter, error = %e, "error looking up host");
            Err(HostCacheError::store(op, subject, e))
        }
    }
}

pub(crate) fn lookup_host<S>(
    store: &S,
    name: &str,
    wanted: Option<&[&str]>,
    op: StoreOp,
) -> Result<Option<Entry>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    let mut hosts = search_hosts(store, &name_filter(name), wanted, op, name)?;
    match hosts.len() {
        0 => Ok(None),
        1 => Ok(hosts.pop()),
        count => {
            error!(host = name, count, "found more than one host with the same name");
            Err(HostCacheError::ConsistencyViolation {
                name: name.to_string(),
                count,
            })
        }
    }
}

/// Looks up the host named `name`.
///
/// Returns `Ok(None)` when no record exists. `wanted` restricts the returned
/// attributes; `None` returns all of them.
pub fn get_host<S>(
    store: &S,
    name: &str,
    wanted: Option<&[&str]>,
) -> Result<Option<Entry>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    if name.is_empty() {
        return Err(HostCacheError::InvalidRequest(
            "host name must not be empty".into(),
        ));
    }
    lookup_host(store, name, wanted, StoreOp::Search)
}

/// Lists every host whose known_hosts expiry is at or after `now`.
pub fn list_valid_hosts<S>(
    store: &S,
    now: i64,
    wanted: Option<&[&str]>,
) -> Result<Vec<Entry>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    search_hosts(store, &valid_hosts_filter(now), wanted, StoreOp::Search, "*")
}

/// [`get_host`] returning the typed record.
pub fn get_host_record<S>(store: &S, name: &str) -> Result<Option<HostRecord>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    get_host(store, name, None)?
        .map(HostRecord::try_from)
        .transpose()
}

/// [`list_valid_hosts`] returning typed records.
pub fn list_valid_host_records<S>(store: &S, now: i64) -> Result<Vec<HostRecord>, HostCacheError>
where
    S: AttributeStore + ?Sized,
{
    list_valid_hosts(store, now, None)?
        .into_iter()
        .map(HostRecord::try_from)
        .collect()
}
