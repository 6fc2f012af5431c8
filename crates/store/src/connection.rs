//! Typed connection handle
//!
//! [`Connection`] wraps a shared backend and turns the raw command surface
//! into typed methods: each helper builds one [`Command`] and destructures
//! the [`Reply`]. Collection handles clone the connection freely - it is an
//! `Arc` underneath, and many handles share one backend.

use crate::backend::{StoreBackend, WatchToken};
use crate::command::{Command, Reply};
use std::sync::Arc;
use tether_core::Result;

/// Shared handle to one store backend.
///
/// Cloning is cheap and every clone talks to the same backend. Identity
/// matters for cross-collection dispatch: operations that mix two remote
/// collections take the native fast path only when
/// [`Connection::same_backend`] holds.
#[derive(Clone)]
pub struct Connection {
    backend: Arc<dyn StoreBackend>,
}

impl Connection {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Connection { backend }
    }

    /// Do these two connections address the same backend?
    pub fn same_backend(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }

    /// Execute one raw command.
    pub fn execute(&self, cmd: Command) -> Result<Reply> {
        self.backend.execute(cmd)
    }

    /// Execute a batch atomically (no watch).
    pub fn exec_atomic(&self, cmds: &[Command]) -> Result<Vec<Reply>> {
        self.backend.exec_atomic(cmds)
    }

    /// Begin a watch on the given keys.
    pub fn watch(&self, keys: &[String]) -> Result<WatchToken> {
        self.backend.watch(keys)
    }

    /// Verify the watch and apply the batch atomically.
    pub fn exec_watched(&self, token: WatchToken, cmds: &[Command]) -> Result<Option<Vec<Reply>>> {
        self.backend.exec_watched(token, cmds)
    }

    /// Abandon a watch.
    pub fn unwatch(&self, token: WatchToken) {
        self.backend.unwatch(token)
    }

    // ---- key ops ----

    /// Does the key exist?
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.execute(Command::Exists(key.to_string()))?.into_bool()
    }

    /// Delete a key; true if it existed.
    pub fn del(&self, key: &str) -> Result<bool> {
        self.execute(Command::Del(key.to_string()))?.into_bool()
    }

    // ---- hash ----

    /// Read one hash field.
    pub fn hget(&self, key: &str, field: &[u8]) -> Result<Option<Vec<u8>>> {
        self.execute(Command::HGet {
            key: key.to_string(),
            field: field.to_vec(),
        })?
        .into_opt_bytes()
    }

    /// Set one hash field; true if the field was newly created.
    pub fn hset(&self, key: &str, field: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        let created = self
            .execute(Command::HSet {
                key: key.to_string(),
                field,
                value,
            })?
            .into_uint()?;
        Ok(created == 1)
    }

    /// Set one hash field only if absent; true if the write happened.
    pub fn hsetnx(&self, key: &str, field: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        self.execute(Command::HSetNx {
            key: key.to_string(),
            field,
            value,
        })?
        .into_bool()
    }

    /// Delete hash fields; number actually removed.
    pub fn hdel(&self, key: &str, fields: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::HDel {
            key: key.to_string(),
            fields,
        })?
        .into_uint()
    }

    /// All field/value pairs.
    pub fn hgetall(&self, key: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.execute(Command::HGetAll(key.to_string()))?.into_pairs()
    }

    /// All field names.
    pub fn hkeys(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::HKeys(key.to_string()))?.into_array()
    }

    /// All field values.
    pub fn hvals(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::HVals(key.to_string()))?.into_array()
    }

    /// Number of fields.
    pub fn hlen(&self, key: &str) -> Result<u64> {
        self.execute(Command::HLen(key.to_string()))?.into_uint()
    }

    /// Does a field exist?
    pub fn hexists(&self, key: &str, field: &[u8]) -> Result<bool> {
        self.execute(Command::HExists {
            key: key.to_string(),
            field: field.to_vec(),
        })?
        .into_bool()
    }

    /// Set many fields in one round trip.
    pub fn hmset(&self, key: &str, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<()> {
        self.execute(Command::HMSet {
            key: key.to_string(),
            entries,
        })?
        .into_ok()
    }

    /// One arbitrary field name, or `None` when the hash is empty.
    pub fn hrandfield(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.execute(Command::HRandField(key.to_string()))?
            .into_opt_bytes()
    }

    // ---- list ----

    /// Inclusive index range (negative indices resolve from the tail).
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::LRange {
            key: key.to_string(),
            start,
            stop,
        })?
        .into_array()
    }

    /// Read one index.
    pub fn lindex(&self, key: &str, index: i64) -> Result<Option<Vec<u8>>> {
        self.execute(Command::LIndex {
            key: key.to_string(),
            index,
        })?
        .into_opt_bytes()
    }

    /// Overwrite one index (must be in bounds).
    pub fn lset(&self, key: &str, index: i64, value: Vec<u8>) -> Result<()> {
        self.execute(Command::LSet {
            key: key.to_string(),
            index,
            value,
        })?
        .into_ok()
    }

    /// List length.
    pub fn llen(&self, key: &str) -> Result<u64> {
        self.execute(Command::LLen(key.to_string()))?.into_uint()
    }

    /// Prepend elements; new length.
    pub fn lpush(&self, key: &str, values: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::LPush {
            key: key.to_string(),
            values,
        })?
        .into_uint()
    }

    /// Append elements; new length.
    pub fn rpush(&self, key: &str, values: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::RPush {
            key: key.to_string(),
            values,
        })?
        .into_uint()
    }

    /// Remove and return the first element.
    pub fn lpop(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.execute(Command::LPop(key.to_string()))?.into_opt_bytes()
    }

    /// Remove and return the last element.
    pub fn rpop(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.execute(Command::RPop(key.to_string()))?.into_opt_bytes()
    }

    /// Keep only the inclusive range, dropping everything else.
    pub fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        self.execute(Command::LTrim {
            key: key.to_string(),
            start,
            stop,
        })?
        .into_ok()
    }

    /// Remove up to `count` head-side occurrences of `value`.
    pub fn lrem(&self, key: &str, count: u64, value: Vec<u8>) -> Result<u64> {
        self.execute(Command::LRem {
            key: key.to_string(),
            count,
            value,
        })?
        .into_uint()
    }

    // ---- set ----

    /// Membership test.
    pub fn sismember(&self, key: &str, member: &[u8]) -> Result<bool> {
        self.execute(Command::SIsMember {
            key: key.to_string(),
            member: member.to_vec(),
        })?
        .into_bool()
    }

    /// Add members; number newly added.
    pub fn sadd(&self, key: &str, members: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::SAdd {
            key: key.to_string(),
            members,
        })?
        .into_uint()
    }

    /// Remove members; number actually removed.
    pub fn srem(&self, key: &str, members: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::SRem {
            key: key.to_string(),
            members,
        })?
        .into_uint()
    }

    /// All members.
    pub fn smembers(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::SMembers(key.to_string()))?.into_array()
    }

    /// Cardinality.
    pub fn scard(&self, key: &str) -> Result<u64> {
        self.execute(Command::SCard(key.to_string()))?.into_uint()
    }

    /// Remove and return one arbitrary member.
    pub fn spop(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.execute(Command::SPop(key.to_string()))?.into_opt_bytes()
    }

    /// Up to `count` distinct random members, without removal.
    pub fn srandmember(&self, key: &str, count: usize) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::SRandMember {
            key: key.to_string(),
            count,
        })?
        .into_array()
    }

    /// Union of the named sets.
    pub fn sunion(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::SUnion(keys))?.into_array()
    }

    /// Intersection of the named sets.
    pub fn sinter(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::SInter(keys))?.into_array()
    }

    /// Difference: first set minus the rest.
    pub fn sdiff(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.execute(Command::SDiff(keys))?.into_array()
    }

    /// Union stored remotely under `dest`; result cardinality.
    pub fn sunionstore(&self, dest: &str, keys: Vec<String>) -> Result<u64> {
        self.execute(Command::SUnionStore {
            dest: dest.to_string(),
            keys,
        })?
        .into_uint()
    }

    /// Intersection stored remotely under `dest`; result cardinality.
    pub fn sinterstore(&self, dest: &str, keys: Vec<String>) -> Result<u64> {
        self.execute(Command::SInterStore {
            dest: dest.to_string(),
            keys,
        })?
        .into_uint()
    }

    /// Difference stored remotely under `dest`; result cardinality.
    pub fn sdiffstore(&self, dest: &str, keys: Vec<String>) -> Result<u64> {
        self.execute(Command::SDiffStore {
            dest: dest.to_string(),
            keys,
        })?
        .into_uint()
    }

    // ---- sorted set ----

    /// Set member scores; number newly added.
    pub fn zadd(&self, key: &str, entries: Vec<(Vec<u8>, f64)>) -> Result<u64> {
        self.execute(Command::ZAdd {
            key: key.to_string(),
            entries,
        })?
        .into_uint()
    }

    /// Read one member's score.
    pub fn zscore(&self, key: &str, member: &[u8]) -> Result<Option<f64>> {
        self.execute(Command::ZScore {
            key: key.to_string(),
            member: member.to_vec(),
        })?
        .into_opt_float()
    }

    /// Add `delta` to a member's score; new score.
    pub fn zincrby(&self, key: &str, member: Vec<u8>, delta: f64) -> Result<f64> {
        self.execute(Command::ZIncrBy {
            key: key.to_string(),
            member,
            delta,
        })?
        .into_float()
    }

    /// Remove members; number actually removed.
    pub fn zrem(&self, key: &str, members: Vec<Vec<u8>>) -> Result<u64> {
        self.execute(Command::ZRem {
            key: key.to_string(),
            members,
        })?
        .into_uint()
    }

    /// Cardinality.
    pub fn zcard(&self, key: &str) -> Result<u64> {
        self.execute(Command::ZCard(key.to_string()))?.into_uint()
    }

    /// Ascending rank, `None` when absent.
    pub fn zrank(&self, key: &str, member: &[u8]) -> Result<Option<u64>> {
        self.execute(Command::ZRank {
            key: key.to_string(),
            member: member.to_vec(),
        })?
        .into_opt_uint()
    }

    /// Descending rank, `None` when absent.
    pub fn zrevrank(&self, key: &str, member: &[u8]) -> Result<Option<u64>> {
        self.execute(Command::ZRevRank {
            key: key.to_string(),
            member: member.to_vec(),
        })?
        .into_opt_uint()
    }

    /// Inclusive rank range with scores.
    pub fn zrange_withscores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        reverse: bool,
    ) -> Result<Vec<(Vec<u8>, f64)>> {
        self.execute(Command::ZRangeWithScores {
            key: key.to_string(),
            start,
            stop,
            reverse,
        })?
        .into_scored()
    }

    /// Inclusive score range with scores, ascending.
    pub fn zrangebyscore_withscores(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<(Vec<u8>, f64)>> {
        self.execute(Command::ZRangeByScoreWithScores {
            key: key.to_string(),
            min,
            max,
        })?
        .into_scored()
    }

    /// Remove an inclusive rank range; number removed.
    pub fn zremrangebyrank(&self, key: &str, start: i64, stop: i64) -> Result<u64> {
        self.execute(Command::ZRemRangeByRank {
            key: key.to_string(),
            start,
            stop,
        })?
        .into_uint()
    }

    /// Remove an inclusive score range; number removed.
    pub fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<u64> {
        self.execute(Command::ZRemRangeByScore {
            key: key.to_string(),
            min,
            max,
        })?
        .into_uint()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}
