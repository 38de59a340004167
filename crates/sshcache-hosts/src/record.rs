//! Typed view of a stored SSH host entry.

use serde::Serialize;

use sshcache_core::{Attributes, Entry};

use crate::error::HostCacheError;
use crate::names::{
    ATTR_KNOWN_HOSTS_EXPIRE, ATTR_LAST_UPDATE, ATTR_NAME, ATTR_NAME_ALIAS, ATTR_OBJECT_CLASS,
    ATTR_SSH_PUBLIC_KEY,
};

/// A cached SSH host.
///
/// Built from an [`Entry`]; attributes that were not requested or never
/// written come back as `None` / empty rather than as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub object_class: Option<String>,
    pub last_update: Option<i64>,
    pub known_hosts_expire: Option<i64>,
    /// Every other attribute, passed through as stored.
    pub attributes: Attributes,
}

impl HostRecord {
    /// Public key lines stored for the host.
    pub fn public_keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.strings(ATTR_SSH_PUBLIC_KEY)
    }

    /// True when the known_hosts data is still valid at `now`.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.known_hosts_expire.is_some_and(|expire| expire >= now)
    }
}

impl TryFrom<Entry> for HostRecord {
    type Error = HostCacheError;

    fn try_from(entry: Entry) -> Result<Self, Self::Error> {
        let mut attributes = entry.attributes;

        let name = attributes
            .first_string(ATTR_NAME)?
            .map(str::to_string)
            .unwrap_or(entry.name);
        let aliases = attributes
            .strings(ATTR_NAME_ALIAS)
            .map(str::to_string)
            .collect();
        let object_class = attributes.first_string(ATTR_OBJECT_CLASS)?.map(str::to_string);
        let last_update = attributes.first_int(ATTR_LAST_UPDATE)?;
        let known_hosts_expire = attributes.first_int(ATTR_KNOWN_HOSTS_EXPIRE)?;

        for attr in [
            ATTR_NAME,
            ATTR_NAME_ALIAS,
            ATTR_OBJECT_CLASS,
            ATTR_LAST_UPDATE,
            ATTR_KNOWN_HOSTS_EXPIRE,
        ] {
            attributes.remove(attr);
        }

        Ok(HostRecord {
            name,
            aliases,
            object_class,
            last_update,
            known_hosts_expire,
            attributes,
        })
    }
}
