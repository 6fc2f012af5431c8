//! Key identity for collection handles
//!
//! A collection lives under one string key in the store's flat keyspace.
//! Callers may supply a key verbatim (adoption, no existence check) or let
//! the library generate one. Generated candidates are collision-resistant
//! UUIDs under a configurable namespace prefix; the generation loop checks
//! each candidate for non-existence and gives up after [`MAX_KEY_ATTEMPTS`].
//!
//! The non-existence check is not atomic with first use. The window is
//! accepted: candidates are 122-bit random, so losing the race requires an
//! adversarial collision.

use uuid::Uuid;

/// Upper bound on generated-key candidates before key generation fails
/// with `Error::KeyExhaustion`.
pub const MAX_KEY_ATTEMPTS: u32 = 3;

/// Namespace prefix for generated collection keys.
///
/// Keys are formatted `<prefix>:<uuid>`. The prefix keeps a shared store's
/// keyspace browsable and lets operators scope eviction rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Namespace(prefix.into())
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.0
    }

    /// Generate one collision-resistant key candidate under this namespace.
    pub fn candidate(&self) -> String {
        format!("{}:{}", self.0, Uuid::new_v4().simple())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace("tether".to_string())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
