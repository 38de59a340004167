//! Namespace, attribute names and defaults for SSH host entries.

/// Namespace holding every SSH host entry.
pub const SSH_HOSTS_NAMESPACE: &str = "ssh_hosts";

/// Object class attribute and the value marking an entry as an SSH host.
pub const ATTR_OBJECT_CLASS: &str = "objectClass";
pub const SSH_HOST_OBJECT_CLASS: &str = "sshHost";

/// Primary host name.
pub const ATTR_NAME: &str = "name";
/// Alternate names the host is known by.
pub const ATTR_NAME_ALIAS: &str = "nameAlias";
/// Unix time of the last successful upsert.
pub const ATTR_LAST_UPDATE: &str = "lastUpdate";
/// Unix time after which the cached known_hosts data is stale.
pub const ATTR_KNOWN_HOSTS_EXPIRE: &str = "sshKnownHostsExpire";
/// Public key lines, one value per key.
pub const ATTR_SSH_PUBLIC_KEY: &str = "sshPublicKey";

/// Attributes the upsert protocol sets itself; callers may not supply them.
pub const RESERVED_ATTRS: [&str; 3] = [ATTR_OBJECT_CLASS, ATTR_NAME, ATTR_NAME_ALIAS];

/// Default validity window for known_hosts data, in seconds.
pub const DEFAULT_KNOWN_HOSTS_TIMEOUT: i64 = 180;
