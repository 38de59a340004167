//! Alias merge engine and the identity attribute builder.
//!
//! [`merge_aliases`] computes the alias list to persist from the stored
//! record (if any) and the alias being added. [`HostAttrs`] turns the
//! caller's payload into the exact attribute set the upsert writes, so the
//! written data can be inspected without touching a store.

use sshcache_core::{AttrValue, Attributes, Entry};

use crate::error::HostCacheError;
use crate::names::{
    ATTR_LAST_UPDATE, ATTR_NAME, ATTR_NAME_ALIAS, ATTR_OBJECT_CLASS, RESERVED_ATTRS,
    SSH_HOST_OBJECT_CLASS,
};

/// Outcome of merging one alias into a stored alias list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMerge {
    /// Aliases to persist, stored ones first in stored order.
    pub aliases: Vec<String>,
    /// Whether the new alias was appended.
    pub added: bool,
}

/// Merges `alias` into the aliases of `existing`.
///
/// Stored aliases are carried over unchanged. The new alias is appended only
/// if no stored alias equals it (exact, case-sensitive) and it is not the
/// host's own `name`. Duplicates already present in a stored record are left
/// alone; only the incoming alias is checked.
pub fn merge_aliases(name: &str, existing: Option<&Entry>, alias: &str) -> AliasMerge {
    let mut aliases = Vec::new();
    let mut already_present = false;

    if let Some(entry) = existing {
        for stored in entry.attributes.strings(ATTR_NAME_ALIAS) {
            if stored == alias {
                already_present = true;
            }
            aliases.push(stored.to_string());
        }
    }

    let added = !already_present && alias != name;
    if added {
        aliases.push(alias.to_string());
    }
    AliasMerge { aliases, added }
}

/// Builder for the attribute set written by an upsert.
#[derive(Debug, Clone)]
pub struct HostAttrs {
    attrs: Attributes,
}

impl HostAttrs {
    /// Validates the request and stamps the object class and `name` onto the
    /// caller's payload.
    pub fn new(name: &str, payload: Attributes) -> Result<Self, HostCacheError> {
        if name.is_empty() {
            return Err(HostCacheError::InvalidRequest(
                "host name must not be empty".into(),
            ));
        }
        if let Some(reserved) = RESERVED_ATTRS.iter().find(|attr| payload.contains(attr)) {
            return Err(HostCacheError::InvalidRequest(format!(
                "attribute '{}' is set by the cache and may not be supplied",
                reserved
            )));
        }

        let mut attrs = payload;
        attrs.add_string(ATTR_OBJECT_CLASS, SSH_HOST_OBJECT_CLASS)?;
        attrs.add_string(ATTR_NAME, name)?;
        Ok(HostAttrs { attrs })
    }

    /// Adds the merged alias list.
    pub fn with_aliases(mut self, merge: &AliasMerge) -> Result<Self, HostCacheError> {
        for alias in &merge.aliases {
            self.attrs.add_string(ATTR_NAME_ALIAS, alias)?;
        }
        Ok(self)
    }

    /// Stamps `lastUpdate` and returns the final attribute set.
    pub fn stamped(mut self, now: i64) -> Result<Attributes, HostCacheError> {
        self.attrs.set_values(ATTR_LAST_UPDATE, [AttrValue::Int(now)])?;
        Ok(self.attrs)
    }
}
