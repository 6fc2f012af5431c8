//! Sequence adapter over a remote list
//!
//! Index reads are single commands; index writes and clamped inserts
//! check the current length inside a transaction so a concurrent shrink
//! can never make them act on a stale length.
//!
//! Only trimming-style range deletion is supported (a contiguous prefix,
//! a contiguous suffix, or everything): the remote structure has no
//! mid-range splice primitive, and a partial emulation would be visible
//! half-applied to other clients. Mid-range deletion fails with
//! `Unsupported` instead.

use crate::handle::Handle;
use crate::operand::OperandClass;
use tether_core::{Error, Result, Value};
use tether_store::Command;
use tether_txn as txn;

/// Source for [`RemoteList::concat`].
pub enum ListSource<'a> {
    /// Another remote-backed list.
    Remote(&'a RemoteList),
    /// An in-process sequence.
    Local(&'a [Value]),
}

/// An ordered sequence of `Value`s stored in a remote list.
#[derive(Debug, Clone)]
pub struct RemoteList {
    handle: Handle,
}

impl RemoteList {
    /// Wrap a handle.
    pub fn new(handle: Handle) -> Self {
        RemoteList { handle }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn key(&self) -> &str {
        self.handle.key()
    }

    /// Length. Single remote command.
    pub fn len(&self) -> Result<u64> {
        self.handle.connection().llen(self.key())
    }

    /// Is the sequence empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read one index (negative resolves from the tail), failing with
    /// `NotFound` when out of bounds. Single remote command.
    pub fn get(&self, index: i64) -> Result<Value> {
        match self.handle.connection().lindex(self.key(), index)? {
            Some(bytes) => self.handle.decode(&bytes),
            None => Err(Error::NotFound(format!("index {}", index))),
        }
    }

    /// Overwrite one index, failing with `NotFound` when out of bounds.
    ///
    /// The bounds check and the write run in one transaction: a concurrent
    /// shrink between them restarts the operation instead of overwriting
    /// the wrong element.
    pub fn set(&self, index: i64, value: &Value) -> Result<()> {
        let key = self.key().to_string();
        let bytes = self.handle.encode(value)?;
        let handle = &self.handle;
        txn::run(
            handle.connection(),
            std::slice::from_ref(&key),
            handle.retry(),
            |t| {
                let len = t.llen(&key)? as i64;
                let resolved = if index < 0 { index + len } else { index };
                if resolved < 0 || resolved >= len {
                    return Err(Error::NotFound(format!("index {}", index)));
                }
                t.stage(Command::LSet {
                    key: key.clone(),
                    index: resolved,
                    value: bytes.clone(),
                });
                Ok(())
            },
        )
    }

    /// Append one element. Single remote command.
    pub fn push_back(&self, value: &Value) -> Result<()> {
        let bytes = self.handle.encode(value)?;
        self.handle.connection().rpush(self.key(), vec![bytes])?;
        Ok(())
    }

    /// Prepend one element. Single remote command.
    pub fn push_front(&self, value: &Value) -> Result<()> {
        let bytes = self.handle.encode(value)?;
        self.handle.connection().lpush(self.key(), vec![bytes])?;
        Ok(())
    }

    /// Append many elements in one round trip.
    pub fn extend(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let encoded = self.encode_all(values)?;
        self.handle.connection().rpush(self.key(), encoded)?;
        Ok(())
    }

    /// Remove and return the first element. Single remote command.
    pub fn pop_front(&self) -> Result<Option<Value>> {
        match self.handle.connection().lpop(self.key())? {
            Some(bytes) => Ok(Some(self.handle.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove and return the last element. Single remote command.
    pub fn pop_back(&self) -> Result<Option<Value>> {
        match self.handle.connection().rpop(self.key())? {
            Some(bytes) => Ok(Some(self.handle.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove and return the element at `index`.
    ///
    /// Only the first and last positions are supported - those are the
    /// store's native O(1) pops. Any interior index fails with
    /// `Unsupported`. Out-of-bounds fails with `NotFound`.
    pub fn pop_at(&self, index: i64) -> Result<Value> {
        let key = self.key().to_string();
        let handle = &self.handle;
        txn::run(
            handle.connection(),
            std::slice::from_ref(&key),
            handle.retry(),
            |t| {
                let len = t.llen(&key)? as i64;
                let resolved = if index < 0 { index + len } else { index };
                if len == 0 || resolved < 0 || resolved >= len {
                    return Err(Error::NotFound(format!("index {}", index)));
                }
                let cmd = if resolved == 0 {
                    Command::LPop(key.clone())
                } else if resolved == len - 1 {
                    Command::RPop(key.clone())
                } else {
                    return Err(Error::Unsupported(
                        "pop is only supported at the first or last index",
                    ));
                };
                let bytes = t
                    .lindex(&key, resolved)?
                    .ok_or_else(|| Error::NotFound(format!("index {}", index)))?;
                let value = handle.decode(&bytes)?;
                t.stage(cmd);
                Ok(value)
            },
        )
    }

    /// Insert `value` before `index`, clamping to the ends.
    ///
    /// An index beyond the front prepends, beyond the back appends, and an
    /// in-range index splices. The decision depends on the current length,
    /// so the whole operation runs in one transaction.
    pub fn insert(&self, index: i64, value: &Value) -> Result<()> {
        let key = self.key().to_string();
        let bytes = self.handle.encode(value)?;
        let handle = &self.handle;
        txn::run(
            handle.connection(),
            std::slice::from_ref(&key),
            handle.retry(),
            |t| {
                let len = t.llen(&key)? as i64;
                let resolved = if index < 0 { index + len } else { index };
                if resolved <= 0 {
                    t.stage(Command::LPush {
                        key: key.clone(),
                        values: vec![bytes.clone()],
                    });
                } else if resolved >= len {
                    t.stage(Command::RPush {
                        key: key.clone(),
                        values: vec![bytes.clone()],
                    });
                } else {
                    // splice: keep the prefix, re-append value + suffix
                    let suffix = t.lrange(&key, resolved, -1)?;
                    let mut values = Vec::with_capacity(suffix.len() + 1);
                    values.push(bytes.clone());
                    values.extend(suffix);
                    t.stage(Command::LTrim {
                        key: key.clone(),
                        start: 0,
                        stop: resolved - 1,
                    });
                    t.stage(Command::RPush {
                        key: key.clone(),
                        values,
                    });
                }
                Ok(())
            },
        )
    }

    /// Remove the first occurrence of `value`, failing with `NotFound`
    /// when the sequence does not contain it. Single remote command.
    pub fn remove(&self, value: &Value) -> Result<()> {
        let bytes = self.handle.encode(value)?;
        let removed = self.handle.connection().lrem(self.key(), 1, bytes)?;
        if removed == 0 {
            return Err(Error::NotFound(format!("{:?}", value)));
        }
        Ok(())
    }

    /// Read the inclusive index range `start..=stop` (negative from the
    /// tail). Single remote command.
    pub fn range(&self, start: i64, stop: i64) -> Result<Vec<Value>> {
        self.handle
            .connection()
            .lrange(self.key(), start, stop)?
            .iter()
            .map(|b| self.handle.decode(b))
            .collect()
    }

    /// Read the whole sequence.
    pub fn to_vec(&self) -> Result<Vec<Value>> {
        self.range(0, -1)
    }

    /// Read a stepped range: the contiguous range is fetched remotely in
    /// one command, then subsampled locally (the store has no native
    /// stepped reads).
    pub fn range_step(&self, start: i64, stop: i64, step: usize) -> Result<Vec<Value>> {
        if step == 0 {
            return Err(Error::Unsupported("slice step of zero"));
        }
        let full = self.range(start, stop)?;
        Ok(full.into_iter().step_by(step).collect())
    }

    /// Delete a contiguous range, expressed Python-slice style with open
    /// ends: `remove_range(None, None)` clears, `remove_range(Some(s),
    /// None)` deletes the suffix from `s`, `remove_range(None, Some(e))`
    /// deletes the prefix up to `e`. A closed mid-range (`Some(s > 0),
    /// Some(e)`) has no trim-shaped equivalent and fails with
    /// `Unsupported`.
    pub fn remove_range(&self, start: Option<i64>, stop: Option<i64>) -> Result<()> {
        match (start, stop) {
            (None, None) => self.clear(),
            (Some(s), None) => {
                if s == 0 {
                    return self.clear();
                }
                // keep [0, s-1]: deletes seq[s..]
                self.handle.connection().ltrim(self.key(), 0, s - 1)
            }
            (None, Some(e)) => {
                // keep [e, -1]: deletes seq[..e]
                self.handle.connection().ltrim(self.key(), e, -1)
            }
            (Some(0), Some(e)) => {
                // closed range anchored at the front is still a prefix trim
                self.handle.connection().ltrim(self.key(), e, -1)
            }
            (Some(_), Some(_)) => Err(Error::Unsupported(
                "only prefix, suffix, or whole-sequence deletion maps to the remote structure",
            )),
        }
    }

    /// Replace the entire contents with `values` in one atomic batch.
    ///
    /// The whole-sequence shape is the only slice assignment the remote
    /// structure supports; partial assignments fall under the same
    /// `Unsupported` rule as mid-range deletion.
    pub fn assign(&self, values: &[Value]) -> Result<()> {
        let mut cmds = vec![Command::Del(self.key().to_string())];
        if !values.is_empty() {
            cmds.push(Command::RPush {
                key: self.key().to_string(),
                values: self.encode_all(values)?,
            });
        }
        self.handle.connection().exec_atomic(&cmds)?;
        Ok(())
    }

    /// Delete everything (and the remote key).
    pub fn clear(&self) -> Result<()> {
        self.handle.clear()
    }

    /// Concatenate into a new remote list under a fresh key.
    ///
    /// When the operand shares this list's backend, both sources are read
    /// and the result seeded inside one transaction, so neither can change
    /// between the reads. Otherwise the sources are read best-effort and
    /// combined locally before writing.
    pub fn concat(&self, other: ListSource<'_>) -> Result<RemoteList> {
        let dest = RemoteList::new(self.handle.sibling()?);
        match other {
            ListSource::Remote(other_list)
                if OperandClass::classify(
                    self.handle.connection(),
                    Some(other_list.handle.connection()),
                ) == OperandClass::RemoteSameConn =>
            {
                let a = self.key().to_string();
                let b = other_list.key().to_string();
                let dest_key = dest.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    let mut values = t.lrange(&a, 0, -1)?;
                    values.extend(t.lrange(&b, 0, -1)?);
                    if !values.is_empty() {
                        t.stage(Command::RPush {
                            key: dest_key.clone(),
                            values,
                        });
                    }
                    Ok(())
                })?;
            }
            ListSource::Remote(other_list) => {
                let mut values = self.to_vec()?;
                values.extend(other_list.to_vec()?);
                dest.extend(&values)?;
            }
            ListSource::Local(tail) => {
                let mut values = self.to_vec()?;
                values.extend_from_slice(tail);
                dest.extend(&values)?;
            }
        }
        Ok(dest)
    }

    /// Repeat this sequence `n` times into a new remote list under a fresh
    /// key. The source is read in one command (a consistent snapshot on
    /// its own); the seeding write is a second round trip.
    pub fn repeat(&self, n: usize) -> Result<RemoteList> {
        let dest = RemoteList::new(self.handle.sibling()?);
        let raw = self.handle.connection().lrange(self.key(), 0, -1)?;
        if raw.is_empty() || n == 0 {
            return Ok(dest);
        }
        let mut values = Vec::with_capacity(raw.len() * n);
        for _ in 0..n {
            values.extend(raw.iter().cloned());
        }
        self.handle.connection().rpush(dest.key(), values)?;
        Ok(dest)
    }

    fn encode_all(&self, values: &[Value]) -> Result<Vec<Vec<u8>>> {
        values.iter().map(|v| self.handle.encode(v)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
