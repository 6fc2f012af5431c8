//! Shared helpers for the integration suite

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tetherdb::{Command, MemoryStore, Reply, StoreBackend, Tether};
use tether_store::WatchToken;

/// A backend wrapper that counts executed commands by name.
///
/// Used to verify dispatch decisions: the fast path of a set-algebra
/// operation must show up as native multi-key commands and zero
/// member enumerations.
pub struct CountingBackend {
    inner: MemoryStore,
    counts: Mutex<HashMap<&'static str, u64>>,
}

impl CountingBackend {
    pub fn new() -> Self {
        CountingBackend {
            inner: MemoryStore::new(),
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.counts.lock().clear();
    }

    fn note(&self, cmd: &Command) {
        *self.counts.lock().entry(cmd.name()).or_insert(0) += 1;
    }
}

impl StoreBackend for CountingBackend {
    fn execute(&self, cmd: Command) -> tetherdb::Result<Reply> {
        self.note(&cmd);
        self.inner.execute(cmd)
    }

    fn exec_atomic(&self, cmds: &[Command]) -> tetherdb::Result<Vec<Reply>> {
        for cmd in cmds {
            self.note(cmd);
        }
        self.inner.exec_atomic(cmds)
    }

    fn watch(&self, keys: &[String]) -> tetherdb::Result<WatchToken> {
        self.inner.watch(keys)
    }

    fn exec_watched(
        &self,
        token: WatchToken,
        cmds: &[Command],
    ) -> tetherdb::Result<Option<Vec<Reply>>> {
        for cmd in cmds {
            self.note(cmd);
        }
        self.inner.exec_watched(token, cmds)
    }

    fn unwatch(&self, token: WatchToken) {
        self.inner.unwatch(token)
    }
}

/// A fresh client over a plain in-memory backend.
pub fn test_db() -> Tether {
    Tether::in_memory()
}

/// A fresh client over a counting backend, returning both.
pub fn counted_db() -> (Tether, Arc<CountingBackend>) {
    let backend = Arc::new(CountingBackend::new());
    let db = Tether::with_backend(backend.clone());
    (db, backend)
}
