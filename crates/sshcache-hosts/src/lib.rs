//! SSH host-identity cache on top of an attribute store.
//!
//! Keeps one record per known SSH server in the `ssh_hosts` namespace of an
//! [`AttributeStore`]: name, aliases, caller payload (public keys),
//! `lastUpdate` and a rolling `sshKnownHostsExpire` timestamp.
//!
//! Every operation takes the store handle explicitly and holds no state
//! between calls:
//!
//! - [`store_host`]: upsert with alias merge, transactional when an alias is
//!   given
//! - [`refresh_expiry`]: attribute-merge write of the expiry only
//! - [`get_host`] / [`list_valid_hosts`]: exact-name lookup and the
//!   "still valid at time T" listing
//! - [`delete_host`]: unconditional removal
//!
//! [`AttributeStore`]: sshcache_storage::AttributeStore

pub mod alias;
pub mod delete;
pub mod error;
pub mod expiry;
pub mod known_hosts;
pub mod names;
pub mod query;
pub mod record;
pub mod txn;
pub mod upsert;

pub use alias::{merge_aliases, AliasMerge, HostAttrs};
pub use delete::delete_host;
pub use error::{HostCacheError, StoreOp};
pub use expiry::refresh_expiry;
pub use known_hosts::render_known_hosts;
pub use query::{get_host, get_host_record, list_valid_host_records, list_valid_hosts};
pub use record::HostRecord;
pub use txn::TransactionGuard;
pub use upsert::store_host;
