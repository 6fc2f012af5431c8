//! Write-back cache overlay for a remote map
//!
//! An explicit two-tier store: a process-private staging map in front of a
//! [`RemoteMap`]. Reads prefer staged entries (and stage remote hits so a
//! retrieved compound value can be mutated and re-read locally); writes
//! stage only. [`CachedMap::sync`] flushes every staged pair in one batched
//! remote write - staging fully overwrites the remote entry for each
//! touched key - and clears the staging tier.
//!
//! Deletes are applied immediately (unstaged locally and deleted remotely)
//! so a removed key can never be resurrected by a later flush.
//!
//! The cache belongs to one handle in one process. It is never shared and
//! never consulted by other handles viewing the same remote key.

use crate::map::{MapSource, RemoteMap};
use std::collections::HashMap;
use tether_core::{Error, Result, Value};

/// The staging tier: key -> value pairs pending flush.
#[derive(Debug, Default)]
pub struct WriteBackCache {
    enabled: bool,
    staged: HashMap<Value, Value>,
}

impl WriteBackCache {
    /// Create a cache, active when `enabled`.
    pub fn new(enabled: bool) -> Self {
        WriteBackCache {
            enabled,
            staged: HashMap::new(),
        }
    }

    /// Is the cache active?
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Read a staged entry.
    pub fn get_staged(&self, key: &Value) -> Option<&Value> {
        if !self.enabled {
            return None;
        }
        self.staged.get(key)
    }

    /// Stage an entry for a later flush.
    pub fn stage(&mut self, key: Value, value: Value) {
        if self.enabled {
            self.staged.insert(key, value);
        }
    }

    /// Drop a staged entry, returning it if present.
    pub fn unstage(&mut self, key: &Value) -> Option<Value> {
        self.staged.remove(key)
    }

    /// Drain every staged pair. The staging tier is empty afterwards.
    pub fn flush(&mut self) -> Vec<(Value, Value)> {
        self.staged.drain().collect()
    }

    /// Number of staged entries.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

/// A [`RemoteMap`] with a write-back staging tier in front of it.
///
/// Mutating methods take `&mut self`: the staging tier is local state, and
/// handles make no claim of thread-safety for concurrent local calls.
#[derive(Debug)]
pub struct CachedMap {
    map: RemoteMap,
    cache: WriteBackCache,
}

impl CachedMap {
    /// Overlay a staging tier on a remote map.
    pub fn new(map: RemoteMap) -> Self {
        CachedMap {
            map,
            cache: WriteBackCache::new(true),
        }
    }

    /// The backing remote map. Reads through it bypass the staging tier.
    pub fn backing(&self) -> &RemoteMap {
        &self.map
    }

    /// The staging tier.
    pub fn cache(&self) -> &WriteBackCache {
        &self.cache
    }

    /// Are there staged writes the store has not seen yet?
    pub fn is_dirty(&self) -> bool {
        self.cache.staged_len() > 0
    }

    /// Read one entry, preferring the staged value. A remote hit is staged
    /// so later local mutation of the returned value can be re-read via
    /// [`CachedMap::set`] + `get` before any flush.
    pub fn get(&mut self, key: &Value) -> Result<Option<Value>> {
        if let Some(staged) = self.cache.get_staged(key) {
            return Ok(Some(staged.clone()));
        }
        match self.map.get(key)? {
            Some(value) => {
                self.cache.stage(key.clone(), value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Read one entry, failing with `NotFound` when absent from both
    /// tiers.
    pub fn fetch(&mut self, key: &Value) -> Result<Value> {
        self.get(key)?
            .ok_or_else(|| Error::NotFound(format!("{:?}", key)))
    }

    /// Write one entry into the staging tier only. The store sees it at
    /// the next [`CachedMap::sync`].
    pub fn set(&mut self, key: &Value, value: &Value) {
        self.cache.stage(key.clone(), value.clone());
    }

    /// Does either tier hold the key?
    pub fn contains_key(&mut self, key: &Value) -> Result<bool> {
        if self.cache.get_staged(key).is_some() {
            return Ok(true);
        }
        self.map.contains_key(key)
    }

    /// Delete one entry from both tiers immediately, failing with
    /// `NotFound` when neither held it.
    pub fn remove(&mut self, key: &Value) -> Result<()> {
        let had_staged = self.cache.unstage(key).is_some();
        match self.map.remove(key) {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() && had_staged => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Delete one entry from both tiers if present. Idempotent.
    pub fn discard(&mut self, key: &Value) -> Result<()> {
        self.cache.unstage(key);
        self.map.discard(key)
    }

    /// Flush every staged pair to the store in one batched write and clear
    /// the staging tier. Staged state fully overwrites remote state for
    /// each touched key; untouched remote keys are left alone.
    pub fn sync(&mut self) -> Result<()> {
        let pairs = self.cache.flush();
        if pairs.is_empty() {
            return Ok(());
        }
        self.map.update(MapSource::Pairs(&pairs))
    }
}

// ============================================================================
// Tests
// ============================================================================
