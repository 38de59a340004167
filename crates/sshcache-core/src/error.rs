//! Core error types for sshcache-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the attribute model itself. Store and protocol failures
//! live in their own crates.

use thiserror::Error;

/// Core errors produced by the sshcache-core crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// An attribute name was empty or contained characters outside
    /// `[A-Za-z0-9_-]`.
    #[error("invalid attribute name: '{name}'")]
    InvalidAttributeName { name: String },

    /// A typed getter found a value of the wrong kind.
    #[error("attribute '{attr}' is not {expected}")]
    TypeMismatch { attr: String, expected: &'static str },
}
