//! Unified error types for tether.
//!
//! One flat taxonomy for the whole library. Transaction conflicts are
//! recovered internally by the engine's retry loop and only surface as
//! [`Error::Conflict`] when a configured retry cap runs out.

use thiserror::Error;

/// All tether errors.
///
/// This is the canonical error type for every public operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested key, member, or index is absent where presence was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// Destructive "take an arbitrary item" operation on an empty collection.
    #[error("empty collection: {0}")]
    EmptyCollection(&'static str),

    /// The requested mutation shape cannot be expressed against the remote
    /// structure (arbitrary slice assignment, mid-sequence pop, ...).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Operand lacks the capability an operation requires.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the operation needed
        expected: &'static str,
        /// What it was given
        actual: &'static str,
    },

    /// Key generation could not find a free key within the attempt bound.
    #[error("key space exhausted after {attempts} attempts")]
    KeyExhaustion {
        /// Number of candidates tried
        attempts: u32,
    },

    /// A transaction's retry budget ran out under contention.
    ///
    /// Never raised by the default (unbounded) retry policy.
    #[error("transaction conflict persisted after {attempts} attempts")]
    Conflict {
        /// Attempts made before giving up
        attempts: u64,
    },

    /// Value serialization or deserialization failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// The store backend reported a failure (transport, wrong structure
    /// kind for a key, ...).
    #[error("store error: {0}")]
    Store(String),

    /// The store returned a reply of unexpected shape. A bug, not a user
    /// error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for tether operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a conflict (retry budget exhausted) error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Check if this is an unsupported-operation error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }

    /// Check if this error came from a collaborator (store or codec) rather
    /// than from collection semantics.
    pub fn is_external(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Codec(_))
    }
}
