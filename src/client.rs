//! The client entry point
//!
//! [`Tether`] bundles a store connection with the codec, key namespace,
//! and retry policy every collection it creates will use. Collections come
//! in two flavors: generated-key (`map()`, `list()`, ...) and adopted-key
//! (`map_named("jobs")`, ...) - adoption takes the key verbatim and may
//! reference existing data.

use std::sync::Arc;
use tether_collections::{CachedMap, Handle, RemoteList, RemoteMap, RemoteSet, SortedCounter};
use tether_core::{Codec, MsgPackCodec, Namespace, Result};
use tether_store::{Connection, MemoryStore, StoreBackend};
use tether_txn::RetryPolicy;

/// Client handle: a connection plus collection defaults.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct Tether {
    conn: Connection,
    codec: Arc<dyn Codec>,
    namespace: Namespace,
    retry: RetryPolicy,
}

impl Tether {
    /// A client over a fresh in-process store. Ideal for tests and local
    /// development; data lives exactly as long as the backend.
    pub fn in_memory() -> Tether {
        Tether::with_backend(Arc::new(MemoryStore::new()))
    }

    /// A client over the given backend with default codec, namespace, and
    /// retry policy.
    pub fn with_backend(backend: Arc<dyn StoreBackend>) -> Tether {
        TetherBuilder::new().backend(backend).build()
    }

    /// Start configuring a client.
    pub fn builder() -> TetherBuilder {
        TetherBuilder::new()
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn created_handle(&self) -> Result<Handle> {
        Ok(Handle::create(
            self.conn.clone(),
            Arc::clone(&self.codec),
            self.namespace.clone(),
        )?
        .with_retry(self.retry.clone()))
    }

    fn adopted_handle(&self, key: impl Into<String>) -> Handle {
        Handle::adopt(
            self.conn.clone(),
            key,
            Arc::clone(&self.codec),
            self.namespace.clone(),
        )
        .with_retry(self.retry.clone())
    }

    /// A new map under a generated key.
    pub fn map(&self) -> Result<RemoteMap> {
        Ok(RemoteMap::new(self.created_handle()?))
    }

    /// A map view of an explicit key.
    pub fn map_named(&self, key: impl Into<String>) -> RemoteMap {
        RemoteMap::new(self.adopted_handle(key))
    }

    /// A new list under a generated key.
    pub fn list(&self) -> Result<RemoteList> {
        Ok(RemoteList::new(self.created_handle()?))
    }

    /// A list view of an explicit key.
    pub fn list_named(&self, key: impl Into<String>) -> RemoteList {
        RemoteList::new(self.adopted_handle(key))
    }

    /// A new set under a generated key.
    pub fn set(&self) -> Result<RemoteSet> {
        Ok(RemoteSet::new(self.created_handle()?))
    }

    /// A set view of an explicit key.
    pub fn set_named(&self, key: impl Into<String>) -> RemoteSet {
        RemoteSet::new(self.adopted_handle(key))
    }

    /// A new sorted counter under a generated key.
    pub fn sorted_counter(&self) -> Result<SortedCounter> {
        Ok(SortedCounter::new(self.created_handle()?))
    }

    /// A sorted counter view of an explicit key.
    pub fn sorted_counter_named(&self, key: impl Into<String>) -> SortedCounter {
        SortedCounter::new(self.adopted_handle(key))
    }

    /// A new write-back cached map under a generated key.
    pub fn cached_map(&self) -> Result<CachedMap> {
        Ok(CachedMap::new(self.map()?))
    }

    /// A write-back cached map view of an explicit key.
    pub fn cached_map_named(&self, key: impl Into<String>) -> CachedMap {
        CachedMap::new(self.map_named(key))
    }
}

impl std::fmt::Debug for Tether {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tether")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Tether`] client.
pub struct TetherBuilder {
    backend: Option<Arc<dyn StoreBackend>>,
    codec: Arc<dyn Codec>,
    namespace: Namespace,
    retry: RetryPolicy,
}

impl TetherBuilder {
    /// Start with defaults: in-memory backend, MessagePack codec, `tether`
    /// namespace, unbounded retries.
    pub fn new() -> TetherBuilder {
        TetherBuilder {
            backend: None,
            codec: Arc::new(MsgPackCodec),
            namespace: Namespace::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Use this store backend.
    pub fn backend(mut self, backend: Arc<dyn StoreBackend>) -> TetherBuilder {
        self.backend = Some(backend);
        self
    }

    /// Use this codec for every collection the client creates.
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> TetherBuilder {
        self.codec = codec;
        self
    }

    /// Prefix generated collection keys with this namespace.
    pub fn namespace(mut self, namespace: Namespace) -> TetherBuilder {
        self.namespace = namespace;
        self
    }

    /// Run compound operations under this retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> TetherBuilder {
        self.retry = retry;
        self
    }

    /// Build the client.
    pub fn build(self) -> Tether {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        Tether {
            conn: Connection::new(backend),
            codec: self.codec,
            namespace: self.namespace,
            retry: self.retry,
        }
    }
}

impl Default for TetherBuilder {
    fn default() -> Self {
        TetherBuilder::new()
    }
}
