//! Collection handle
//!
//! A [`Handle`] identifies one remote-backed collection instance: the
//! connection, the key, the codec, and the retry policy its compound
//! operations run under. Handles are views, not owners - two handles with
//! the same key on the same backend observe the same data, and dropping a
//! handle never touches the store.

use std::sync::Arc;
use tether_core::{Codec, Error, Namespace, Result, Value, MAX_KEY_ATTEMPTS};
use tether_store::Connection;
use tether_txn::RetryPolicy;

/// Identity and shared plumbing for one remote collection.
#[derive(Clone)]
pub struct Handle {
    conn: Connection,
    key: String,
    codec: Arc<dyn Codec>,
    namespace: Namespace,
    retry: RetryPolicy,
}

impl Handle {
    /// Adopt an explicit key verbatim.
    ///
    /// No existence check: the key may already hold data (the handle
    /// becomes a view of it) or may not exist yet.
    pub fn adopt(
        conn: Connection,
        key: impl Into<String>,
        codec: Arc<dyn Codec>,
        namespace: Namespace,
    ) -> Handle {
        Handle {
            conn,
            key: key.into(),
            codec,
            namespace,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a handle under a freshly generated key.
    ///
    /// Generates collision-resistant candidates and checks each for
    /// non-existence, giving up with [`Error::KeyExhaustion`] after
    /// [`MAX_KEY_ATTEMPTS`]. The check is not atomic with first use; the
    /// accepted race window is documented on [`Namespace`].
    pub fn create(conn: Connection, codec: Arc<dyn Codec>, namespace: Namespace) -> Result<Handle> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let candidate = namespace.candidate();
            if !conn.exists(&candidate)? {
                return Ok(Handle {
                    conn,
                    key: candidate,
                    codec,
                    namespace,
                    retry: RetryPolicy::default(),
                });
            }
            tracing::debug!(candidate, "generated key already occupied, retrying");
        }
        Err(Error::KeyExhaustion {
            attempts: MAX_KEY_ATTEMPTS,
        })
    }

    /// Derive a sibling handle under a freshly generated key, reusing this
    /// handle's connection, codec, namespace, and retry policy.
    ///
    /// Used by operations that produce new collections (concatenation, set
    /// algebra stored remotely).
    pub fn sibling(&self) -> Result<Handle> {
        let mut handle = Handle::create(
            self.conn.clone(),
            Arc::clone(&self.codec),
            self.namespace.clone(),
        )?;
        handle.retry = self.retry.clone();
        Ok(handle)
    }

    /// Replace the retry policy compound operations run under.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Handle {
        self.retry = retry;
        self
    }

    /// The remote key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The store connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The retry policy for compound operations.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Does the remote key currently exist?
    pub fn exists(&self) -> Result<bool> {
        self.conn.exists(&self.key)
    }

    /// Delete the remote key and all its data.
    pub fn clear(&self) -> Result<()> {
        self.conn.del(&self.key)?;
        Ok(())
    }

    /// Encode a value through the handle's codec.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        self.codec.encode(value)
    }

    /// Decode bytes through the handle's codec.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        self.codec.decode(bytes)
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").field("key", &self.key).finish_non_exhaustive()
    }
}
