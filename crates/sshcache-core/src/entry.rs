//! A named attribute bag as returned by store searches.

use serde::{Deserialize, Serialize};

use crate::attrs::Attributes;

/// A record persisted by an attribute store: its key within a namespace
/// plus the attributes read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry key, unique within its namespace.
    pub name: String,
    /// Stored attributes (possibly projected by the search).
    pub attributes: Attributes,
}

impl Entry {
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Entry {
            name: name.into(),
            attributes,
        }
    }
}
