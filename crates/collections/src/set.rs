//! Set adapter over a remote set
//!
//! Membership, add, and remove are single commands. Set algebra dispatches
//! on operand class before anything executes:
//!
//! - **fast path** (both operands remote, same backend): the store's
//!   native multi-key commands compute the result remotely and store it
//!   directly under the new collection's key - no member is ever
//!   materialized locally
//! - **fallback path** (other backend, or a plain in-process set): remote
//!   operands are fetched, the algebra runs on local `HashSet`s, and the
//!   result is written back
//!
//! Symmetric difference has no single native command; the remote path
//! emulates it with two difference reads combined under one transaction so
//! both differences see the same snapshot. Pure comparisons reuse the same
//! dispatch; on the fast path they run as read-only transactions, which
//! still validate that the multi-key snapshot was consistent.

use crate::handle::Handle;
use crate::operand::OperandClass;
use std::collections::HashSet;
use tether_core::{Error, Result, Value};
use tether_store::Command;
use tether_txn as txn;

/// Operand for set algebra and comparisons.
pub enum SetSource<'a> {
    /// Another remote-backed set.
    Remote(&'a RemoteSet),
    /// A plain in-process set.
    Local(&'a HashSet<Value>),
}

/// An unordered collection of unique `Value`s stored in a remote set.
#[derive(Debug, Clone)]
pub struct RemoteSet {
    handle: Handle,
}

enum Algebra {
    Union,
    Intersection,
    Difference,
}

impl RemoteSet {
    /// Wrap a handle.
    pub fn new(handle: Handle) -> Self {
        RemoteSet { handle }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn key(&self) -> &str {
        self.handle.key()
    }

    fn classify(&self, source: &SetSource<'_>) -> OperandClass {
        match source {
            SetSource::Remote(other) => OperandClass::classify(
                self.handle.connection(),
                Some(other.handle.connection()),
            ),
            SetSource::Local(_) => OperandClass::Local,
        }
    }

    /// Cardinality. Single remote command.
    pub fn len(&self) -> Result<u64> {
        self.handle.connection().scard(self.key())
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Membership test. Single remote command.
    pub fn contains(&self, value: &Value) -> Result<bool> {
        let member = self.handle.encode(value)?;
        self.handle.connection().sismember(self.key(), &member)
    }

    /// Add one member; `true` if it was not present before. Single remote
    /// command.
    pub fn insert(&self, value: &Value) -> Result<bool> {
        let member = self.handle.encode(value)?;
        Ok(self.handle.connection().sadd(self.key(), vec![member])? == 1)
    }

    /// Add many members in one round trip.
    pub fn extend(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let members = self.encode_all(values)?;
        self.handle.connection().sadd(self.key(), members)?;
        Ok(())
    }

    /// Remove one member, failing with `NotFound` when absent. When
    /// "remove if present" is all that is needed, prefer
    /// [`RemoteSet::discard`].
    pub fn remove(&self, value: &Value) -> Result<()> {
        let member = self.handle.encode(value)?;
        let removed = self.handle.connection().srem(self.key(), vec![member])?;
        if removed == 0 {
            return Err(Error::NotFound(format!("{:?}", value)));
        }
        Ok(())
    }

    /// Remove one member if present. Idempotent, never fails on absence.
    pub fn discard(&self, value: &Value) -> Result<()> {
        let member = self.handle.encode(value)?;
        self.handle.connection().srem(self.key(), vec![member])?;
        Ok(())
    }

    /// Remove and return an arbitrary member, failing with
    /// `EmptyCollection` when the set is empty. Single remote command.
    pub fn take(&self) -> Result<Value> {
        match self.handle.connection().spop(self.key())? {
            Some(bytes) => self.handle.decode(&bytes),
            None => Err(Error::EmptyCollection("set")),
        }
    }

    /// One random member without removal, `None` when empty. Single remote
    /// command.
    pub fn random_member(&self) -> Result<Option<Value>> {
        Ok(self.random_members(1)?.into_iter().next())
    }

    /// Up to `count` distinct random members without removal. Single
    /// remote command.
    pub fn random_members(&self, count: usize) -> Result<Vec<Value>> {
        self.handle
            .connection()
            .srandmember(self.key(), count)?
            .iter()
            .map(|m| self.handle.decode(m))
            .collect()
    }

    /// All members. One remote enumeration.
    pub fn members(&self) -> Result<HashSet<Value>> {
        self.handle
            .connection()
            .smembers(self.key())?
            .iter()
            .map(|m| self.handle.decode(m))
            .collect()
    }

    /// Delete every member (and the remote key).
    pub fn clear(&self) -> Result<()> {
        self.handle.clear()
    }

    // ---- algebra ----

    /// Union into a new remote set under a fresh key.
    pub fn union(&self, other: SetSource<'_>) -> Result<RemoteSet> {
        self.algebra(Algebra::Union, other)
    }

    /// Intersection into a new remote set under a fresh key.
    pub fn intersection(&self, other: SetSource<'_>) -> Result<RemoteSet> {
        self.algebra(Algebra::Intersection, other)
    }

    /// Difference (self minus other) into a new remote set under a fresh
    /// key.
    pub fn difference(&self, other: SetSource<'_>) -> Result<RemoteSet> {
        self.algebra(Algebra::Difference, other)
    }

    fn algebra(&self, op: Algebra, other: SetSource<'_>) -> Result<RemoteSet> {
        let dest = RemoteSet::new(self.handle.sibling()?);
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                // native multi-key command, result stored remotely in one
                // round trip with zero local materialization
                let keys = vec![self.key().to_string(), other_set.key().to_string()];
                let conn = self.handle.connection();
                let _card = match op {
                    Algebra::Union => conn.sunionstore(dest.key(), keys)?,
                    Algebra::Intersection => conn.sinterstore(dest.key(), keys)?,
                    Algebra::Difference => conn.sdiffstore(dest.key(), keys)?,
                };
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                let result: Vec<Value> = match op {
                    Algebra::Union => mine.union(&theirs).cloned().collect(),
                    Algebra::Intersection => mine.intersection(&theirs).cloned().collect(),
                    Algebra::Difference => mine.difference(&theirs).cloned().collect(),
                };
                dest.extend(&result)?;
            }
        }
        Ok(dest)
    }

    /// Symmetric difference into a new remote set under a fresh key.
    ///
    /// No native command exists; the same-backend path runs two difference
    /// reads and a union of the (disjoint) results inside one transaction
    /// so both differences observe the same snapshot.
    pub fn symmetric_difference(&self, other: SetSource<'_>) -> Result<RemoteSet> {
        let dest = RemoteSet::new(self.handle.sibling()?);
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                let a = self.key().to_string();
                let b = other_set.key().to_string();
                let dest_key = dest.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    let mut members = t.sdiff(vec![a.clone(), b.clone()])?;
                    members.extend(t.sdiff(vec![b.clone(), a.clone()])?);
                    if !members.is_empty() {
                        t.stage(Command::SAdd {
                            key: dest_key.clone(),
                            members,
                        });
                    }
                    Ok(())
                })?;
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                let result: Vec<Value> = mine.symmetric_difference(&theirs).cloned().collect();
                dest.extend(&result)?;
            }
        }
        Ok(dest)
    }

    // ---- comparisons ----

    /// Is every member of this set also in `other`?
    pub fn is_subset(&self, other: SetSource<'_>) -> Result<bool> {
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                let a = self.key().to_string();
                let b = other_set.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    Ok(t.sdiff(vec![a.clone(), b.clone()])?.is_empty())
                })
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                Ok(mine.is_subset(&theirs))
            }
        }
    }

    /// Does this set contain every member of `other`?
    pub fn is_superset(&self, other: SetSource<'_>) -> Result<bool> {
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                let a = self.key().to_string();
                let b = other_set.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    Ok(t.sdiff(vec![b.clone(), a.clone()])?.is_empty())
                })
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                Ok(mine.is_superset(&theirs))
            }
        }
    }

    /// Do the two sets share no members?
    pub fn is_disjoint(&self, other: SetSource<'_>) -> Result<bool> {
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                let a = self.key().to_string();
                let b = other_set.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    Ok(t.sinter(vec![a.clone(), b.clone()])?.is_empty())
                })
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                Ok(mine.is_disjoint(&theirs))
            }
        }
    }

    /// Do the two sets hold exactly the same members?
    pub fn set_eq(&self, other: SetSource<'_>) -> Result<bool> {
        match (self.classify(&other), other) {
            (OperandClass::RemoteSameConn, SetSource::Remote(other_set)) => {
                let a = self.key().to_string();
                let b = other_set.key().to_string();
                let watched = vec![a.clone(), b.clone()];
                let handle = &self.handle;
                txn::run(handle.connection(), &watched, handle.retry(), |t| {
                    Ok(t.sdiff(vec![a.clone(), b.clone()])?.is_empty()
                        && t.sdiff(vec![b.clone(), a.clone()])?.is_empty())
                })
            }
            (_, other) => {
                let mine = self.members()?;
                let theirs = Self::materialize(&other)?;
                Ok(mine == theirs)
            }
        }
    }

    fn materialize(source: &SetSource<'_>) -> Result<HashSet<Value>> {
        match source {
            SetSource::Remote(other) => other.members(),
            SetSource::Local(set) => Ok((*set).clone()),
        }
    }

    fn encode_all(&self, values: &[Value]) -> Result<Vec<Vec<u8>>> {
        values.iter().map(|v| self.handle.encode(v)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
