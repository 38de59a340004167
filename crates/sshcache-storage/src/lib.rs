//! Storage abstraction for sshcache entries.
//!
//! Provides the [`AttributeStore`] trait defining the contract every backend
//! implements, plus the [`InMemoryStore`] and [`SqliteStore`] as first-class
//! backends.
//!
//! # Architecture
//!
//! A store holds named entries grouped into namespaces. Each entry is a
//! multi-valued attribute bag. Writes come in two flavours, full replace
//! (`store_entry`) and attribute merge (`update_entry`); searches evaluate a
//! backend-neutral [`sshcache_core::Filter`]; transactions nest.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: AttributeStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::AttributeStore;
