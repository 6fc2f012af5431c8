//! Mapping adapter over a remote hash
//!
//! Field lookups, writes, and deletes are single store commands. The
//! compound operations keep their promises differently:
//!
//! - [`RemoteMap::pop`] and [`RemoteMap::set_default`] are chained command
//!   pairs executed atomically by the store (no transaction needed)
//! - [`RemoteMap::pop_item`] must discover which field exists before it can
//!   delete that specific field, so it runs on the transaction engine
//! - [`RemoteMap::update`] from another remote map reads the source
//!   consistently before any write begins
//!
//! `get` misses only on absence: a stored `Null`, `false`, `0`, or empty
//! string is returned as-is, never mistaken for a miss.

use crate::handle::Handle;
use crate::operand::OperandClass;
use tether_core::{Error, Result, Value};
use tether_store::{Command, Reply};
use tether_txn as txn;

/// Source for a bulk [`RemoteMap::update`].
pub enum MapSource<'a> {
    /// Another remote-backed map.
    Remote(&'a RemoteMap),
    /// In-process key/value pairs.
    Pairs(&'a [(Value, Value)]),
}

/// A mapping of `Value` keys to `Value` values stored in a remote hash.
#[derive(Debug, Clone)]
pub struct RemoteMap {
    handle: Handle,
}

impl RemoteMap {
    /// Wrap a handle.
    pub fn new(handle: Handle) -> Self {
        RemoteMap { handle }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn key(&self) -> &str {
        self.handle.key()
    }

    /// Number of entries. Single remote command.
    pub fn len(&self) -> Result<u64> {
        self.handle.connection().hlen(self.key())
    }

    /// Is the map empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Does `key` have an entry? Single remote command.
    pub fn contains_key(&self, key: &Value) -> Result<bool> {
        let field = self.handle.encode(key)?;
        self.handle.connection().hexists(self.key(), &field)
    }

    /// Read one entry; `None` only when the key is absent.
    ///
    /// Prefer this over [`RemoteMap::fetch`] in performance-sensitive code:
    /// a miss costs one round trip and no error construction.
    pub fn get(&self, key: &Value) -> Result<Option<Value>> {
        let field = self.handle.encode(key)?;
        match self.handle.connection().hget(self.key(), &field)? {
            Some(bytes) => Ok(Some(self.handle.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read one entry, failing with `NotFound` when absent.
    pub fn fetch(&self, key: &Value) -> Result<Value> {
        self.get(key)?
            .ok_or_else(|| Error::NotFound(format!("{:?}", key)))
    }

    /// Write one entry, overwriting unconditionally. Single remote command.
    pub fn set(&self, key: &Value, value: &Value) -> Result<()> {
        let field = self.handle.encode(key)?;
        let bytes = self.handle.encode(value)?;
        self.handle.connection().hset(self.key(), field, bytes)?;
        Ok(())
    }

    /// Delete one entry, failing with `NotFound` when it was already
    /// absent. When "remove if present" is all that is needed, prefer
    /// [`RemoteMap::discard`].
    pub fn remove(&self, key: &Value) -> Result<()> {
        let field = self.handle.encode(key)?;
        let removed = self.handle.connection().hdel(self.key(), vec![field])?;
        if removed == 0 {
            return Err(Error::NotFound(format!("{:?}", key)));
        }
        Ok(())
    }

    /// Delete one entry if present. Idempotent, never fails on absence.
    pub fn discard(&self, key: &Value) -> Result<()> {
        let field = self.handle.encode(key)?;
        self.handle.connection().hdel(self.key(), vec![field])?;
        Ok(())
    }

    /// Remove and return one entry, failing with `NotFound` when absent.
    ///
    /// Read and delete execute as one atomic command pair - no other
    /// client can observe or interleave between them.
    pub fn pop(&self, key: &Value) -> Result<Value> {
        match self.pop_inner(key)? {
            Some(value) => Ok(value),
            None => Err(Error::NotFound(format!("{:?}", key))),
        }
    }

    /// Remove and return one entry, or the default when absent.
    pub fn pop_or(&self, key: &Value, default: Value) -> Result<Value> {
        Ok(self.pop_inner(key)?.unwrap_or(default))
    }

    fn pop_inner(&self, key: &Value) -> Result<Option<Value>> {
        let field = self.handle.encode(key)?;
        let replies = self.handle.connection().exec_atomic(&[
            Command::HGet {
                key: self.key().to_string(),
                field: field.clone(),
            },
            Command::HDel {
                key: self.key().to_string(),
                fields: vec![field],
            },
        ])?;
        let mut replies = replies.into_iter();
        let read = replies
            .next()
            .ok_or_else(|| Error::Protocol("short batch reply".into()))?;
        match read.into_opt_bytes()? {
            Some(bytes) => Ok(Some(self.handle.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove and return an arbitrary entry.
    ///
    /// Runs as a transaction: one arbitrary field name is read, then
    /// exactly that field is deleted, conditionally on the hash not having
    /// changed in between. Fails with `EmptyCollection` when the hash has
    /// no fields at the read step.
    pub fn pop_item(&self) -> Result<(Value, Value)> {
        let key = self.key().to_string();
        let handle = &self.handle;
        txn::run(
            handle.connection(),
            std::slice::from_ref(&key),
            handle.retry(),
            |t| {
                let Some(field) = t.hrandfield(&key)? else {
                    return Err(Error::EmptyCollection("map"));
                };
                let value = match t.hget(&key, &field)? {
                    Some(bytes) => handle.decode(&bytes)?,
                    // The field vanished between the two reads, which means
                    // a watched mutation happened and this pass cannot
                    // commit; the placeholder is never observed.
                    None => Value::Null,
                };
                t.stage(Command::HDel {
                    key: key.clone(),
                    fields: vec![field.clone()],
                });
                Ok((handle.decode(&field)?, value))
            },
        )
    }

    /// Set `key` to `default` if absent, then return the current value.
    ///
    /// The conditional set and the read execute as one atomic command
    /// pair, so the returned value is exactly what the map holds after the
    /// call.
    pub fn set_default(&self, key: &Value, default: &Value) -> Result<Value> {
        let field = self.handle.encode(key)?;
        let bytes = self.handle.encode(default)?;
        let replies = self.handle.connection().exec_atomic(&[
            Command::HSetNx {
                key: self.key().to_string(),
                field: field.clone(),
                value: bytes,
            },
            Command::HGet {
                key: self.key().to_string(),
                field,
            },
        ])?;
        let read = replies
            .into_iter()
            .nth(1)
            .ok_or_else(|| Error::Protocol("short batch reply".into()))?;
        match read {
            Reply::Bytes(bytes) => self.handle.decode(&bytes),
            other => Err(Error::Protocol(format!(
                "set_default read returned {:?} for a field that was just ensured",
                other
            ))),
        }
    }

    /// Compute a default, set it if the key is absent, return the current
    /// value. The factory runs before the store is consulted, so it may be
    /// invoked even when the key turns out to be present.
    pub fn fetch_or_insert_with(&self, key: &Value, default: impl FnOnce() -> Value) -> Result<Value> {
        let default = default();
        self.set_default(key, &default)
    }

    /// Bulk-write entries from another map or from in-process pairs.
    ///
    /// A remote source sharing this map's backend is read inside one
    /// transaction spanning both keys, so the copied entries reflect a
    /// single point in time. A remote source on another backend is fetched
    /// first (no cross-backend atomicity exists), then written. In-process
    /// pairs go out as one batched write.
    pub fn update(&self, source: MapSource<'_>) -> Result<()> {
        match source {
            MapSource::Pairs(pairs) => {
                let entries = self.encode_pairs(pairs)?;
                if entries.is_empty() {
                    return Ok(());
                }
                self.handle.connection().hmset(self.key(), entries)
            }
            MapSource::Remote(other) => {
                let class = OperandClass::classify(
                    self.handle.connection(),
                    Some(other.handle.connection()),
                );
                match class {
                    OperandClass::RemoteSameConn => self.update_from_same_backend(other),
                    _ => {
                        let pairs = other.items()?;
                        self.update(MapSource::Pairs(&pairs))
                    }
                }
            }
        }
    }

    fn update_from_same_backend(&self, other: &RemoteMap) -> Result<()> {
        let dest = self.key().to_string();
        let src = other.key().to_string();
        let watched = vec![dest.clone(), src.clone()];
        let handle = &self.handle;
        txn::run(handle.connection(), &watched, handle.retry(), |t| {
            let raw = t.hgetall(&src)?;
            if raw.is_empty() {
                return Ok(());
            }
            // Re-encode through this map's codec in case the source handle
            // encodes differently.
            let mut entries = Vec::with_capacity(raw.len());
            for (field, value) in raw {
                let key = other.handle.decode(&field)?;
                let val = other.handle.decode(&value)?;
                entries.push((handle.encode(&key)?, handle.encode(&val)?));
            }
            t.stage(Command::HMSet {
                key: dest.clone(),
                entries,
            });
            Ok(())
        })
    }

    fn encode_pairs(&self, pairs: &[(Value, Value)]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        pairs
            .iter()
            .map(|(k, v)| Ok((self.handle.encode(k)?, self.handle.encode(v)?)))
            .collect()
    }

    /// All keys. One remote enumeration.
    pub fn keys(&self) -> Result<Vec<Value>> {
        self.handle
            .connection()
            .hkeys(self.key())?
            .iter()
            .map(|f| self.handle.decode(f))
            .collect()
    }

    /// All values. One remote enumeration.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.handle
            .connection()
            .hvals(self.key())?
            .iter()
            .map(|v| self.handle.decode(v))
            .collect()
    }

    /// All entries. One remote enumeration.
    pub fn items(&self) -> Result<Vec<(Value, Value)>> {
        self.handle
            .connection()
            .hgetall(self.key())?
            .iter()
            .map(|(f, v)| Ok((self.handle.decode(f)?, self.handle.decode(v)?)))
            .collect()
    }

    /// Delete every entry (and the remote key).
    pub fn clear(&self) -> Result<()> {
        self.handle.clear()
    }
}

// ============================================================================
// Tests
// ============================================================================
