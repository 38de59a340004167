//! Attribute model shared by every sshcache crate.
//!
//! # Modules
//!
//! - [`attrs`]: `AttrValue` and the multi-valued `Attributes` bag
//! - [`entry`]: `Entry`, a named attribute bag returned by searches
//! - [`filter`]: `Filter`, backend-neutral search predicates
//! - [`error`]: `CoreError`

pub mod attrs;
pub mod entry;
pub mod error;
pub mod filter;

// Re-export commonly used types
pub use attrs::{validate_attr_name, AttrValue, Attributes, Values};
pub use entry::Entry;
pub use error::CoreError;
pub use filter::Filter;
