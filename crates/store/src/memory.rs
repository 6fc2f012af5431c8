//! In-process reference backend
//!
//! [`MemoryStore`] implements the full command surface plus the watch
//! protocol against process-local state. It backs the test suite and the
//! facade's in-memory mode.
//!
//! ## Versioning
//!
//! A single keyspace mutex guards a global mutation clock. Every actual
//! modification of a key stamps that key with the next clock value;
//! deletions leave a tombstone stamp so delete/recreate cycles are visible
//! to watchers. `watch` records the stamp of each watched key (0 for keys
//! never written); `exec_watched` re-reads the stamps under the same lock
//! and applies the batch only when all of them are unchanged. Holding one
//! lock across verify-and-apply is what makes the optimistic-lock primitive
//! atomic here, the way a single-threaded command loop makes it atomic in
//! the modeled store.
//!
//! ## Structure kinds
//!
//! A key holds exactly one structure kind. Commands addressing a key of
//! another kind fail with a wrong-type store error, and structures never
//! exist empty: the last removing command deletes the key.

use crate::backend::{StoreBackend, WatchToken};
use crate::command::{Command, Reply};
use parking_lot::Mutex;
use rand::seq::IteratorRandom;
use std::collections::{HashMap, HashSet, VecDeque};
use tether_core::{Error, Result};

const WRONG_TYPE: &str = "WRONGTYPE operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
enum Structure {
    Hash(HashMap<Vec<u8>, Vec<u8>>),
    List(VecDeque<Vec<u8>>),
    Set(HashSet<Vec<u8>>),
    Zset(HashMap<Vec<u8>, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    structure: Structure,
    version: u64,
}

#[derive(Default)]
struct Inner {
    keyspace: HashMap<String, Entry>,
    /// Stamp of the deletion that removed a key, so delete/recreate cycles
    /// conflict with in-flight watches.
    tombstones: HashMap<String, u64>,
    clock: u64,
    watches: HashMap<u64, Vec<(String, u64)>>,
    next_token: u64,
}

impl Inner {
    fn observed_version(&self, key: &str) -> u64 {
        if let Some(entry) = self.keyspace.get(key) {
            entry.version
        } else {
            self.tombstones.get(key).copied().unwrap_or(0)
        }
    }

    fn touch(&mut self, key: &str) {
        self.clock += 1;
        let clock = self.clock;
        if let Some(entry) = self.keyspace.get_mut(key) {
            entry.version = clock;
        }
    }

    fn remove_key(&mut self, key: &str) -> bool {
        if self.keyspace.remove(key).is_some() {
            self.clock += 1;
            self.tombstones.insert(key.to_string(), self.clock);
            true
        } else {
            false
        }
    }

    /// Drop the key if its structure ended up empty.
    fn gc_if_empty(&mut self, key: &str) {
        let empty = match self.keyspace.get(key).map(|e| &e.structure) {
            Some(Structure::Hash(h)) => h.is_empty(),
            Some(Structure::List(l)) => l.is_empty(),
            Some(Structure::Set(s)) => s.is_empty(),
            Some(Structure::Zset(z)) => z.is_empty(),
            None => false,
        };
        if empty {
            self.remove_key(key);
        }
    }

    fn hash(&self, key: &str) -> Result<Option<&HashMap<Vec<u8>, Vec<u8>>>> {
        match self.keyspace.get(key).map(|e| &e.structure) {
            Some(Structure::Hash(h)) => Ok(Some(h)),
            Some(_) => Err(Error::Store(WRONG_TYPE.into())),
            None => Ok(None),
        }
    }

    fn hash_mut(&mut self, key: &str) -> Result<&mut HashMap<Vec<u8>, Vec<u8>>> {
        let entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                structure: Structure::Hash(HashMap::new()),
                version: 0,
            });
        match &mut entry.structure {
            Structure::Hash(h) => Ok(h),
            _ => Err(Error::Store(WRONG_TYPE.into())),
        }
    }

    fn list(&self, key: &str) -> Result<Option<&VecDeque<Vec<u8>>>> {
        match self.keyspace.get(key).map(|e| &e.structure) {
            Some(Structure::List(l)) => Ok(Some(l)),
            Some(_) => Err(Error::Store(WRONG_TYPE.into())),
            None => Ok(None),
        }
    }

    fn list_mut(&mut self, key: &str) -> Result<&mut VecDeque<Vec<u8>>> {
        let entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                structure: Structure::List(VecDeque::new()),
                version: 0,
            });
        match &mut entry.structure {
            Structure::List(l) => Ok(l),
            _ => Err(Error::Store(WRONG_TYPE.into())),
        }
    }

    fn set(&self, key: &str) -> Result<Option<&HashSet<Vec<u8>>>> {
        match self.keyspace.get(key).map(|e| &e.structure) {
            Some(Structure::Set(s)) => Ok(Some(s)),
            Some(_) => Err(Error::Store(WRONG_TYPE.into())),
            None => Ok(None),
        }
    }

    fn set_mut(&mut self, key: &str) -> Result<&mut HashSet<Vec<u8>>> {
        let entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                structure: Structure::Set(HashSet::new()),
                version: 0,
            });
        match &mut entry.structure {
            Structure::Set(s) => Ok(s),
            _ => Err(Error::Store(WRONG_TYPE.into())),
        }
    }

    fn zset(&self, key: &str) -> Result<Option<&HashMap<Vec<u8>, f64>>> {
        match self.keyspace.get(key).map(|e| &e.structure) {
            Some(Structure::Zset(z)) => Ok(Some(z)),
            Some(_) => Err(Error::Store(WRONG_TYPE.into())),
            None => Ok(None),
        }
    }

    fn zset_mut(&mut self, key: &str) -> Result<&mut HashMap<Vec<u8>, f64>> {
        let entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                structure: Structure::Zset(HashMap::new()),
                version: 0,
            });
        match &mut entry.structure {
            Structure::Zset(z) => Ok(z),
            _ => Err(Error::Store(WRONG_TYPE.into())),
        }
    }
}

/// Resolve a possibly-negative inclusive range against a length.
///
/// Returns `None` when the normalized range is empty.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len_i = len as i64;
    let mut start = if start < 0 { start + len_i } else { start };
    let mut stop = if stop < 0 { stop + len_i } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= len_i {
        stop = len_i - 1;
    }
    if len == 0 || start > stop || start >= len_i || stop < 0 {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

/// Members of a sorted set ordered by (score, member bytes).
fn zset_sorted(z: &HashMap<Vec<u8>, f64>) -> Vec<(Vec<u8>, f64)> {
    let mut entries: Vec<(Vec<u8>, f64)> = z.iter().map(|(m, s)| (m.clone(), *s)).collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// In-process store backend with full watch semantics.
///
/// Wrap it in an `Arc` and hand clones of the same `Connection` to every
/// collection that should share the keyspace.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryStore {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn apply(inner: &mut Inner, cmd: &Command) -> Result<Reply> {
        match cmd {
            // ---- key ops ----
            Command::Exists(key) => Ok(Reply::Bool(inner.keyspace.contains_key(key))),
            Command::Del(key) => Ok(Reply::Bool(inner.remove_key(key))),

            // ---- hash ----
            Command::HGet { key, field } => Ok(inner
                .hash(key)?
                .and_then(|h| h.get(field))
                .map(|v| Reply::Bytes(v.clone()))
                .unwrap_or(Reply::Nil)),
            Command::HSet { key, field, value } => {
                let hash = inner.hash_mut(key)?;
                let created = hash.insert(field.clone(), value.clone()).is_none();
                inner.touch(key);
                Ok(Reply::Int(created as u64))
            }
            Command::HSetNx { key, field, value } => {
                let hash = inner.hash_mut(key)?;
                let wrote = if hash.contains_key(field) {
                    false
                } else {
                    hash.insert(field.clone(), value.clone());
                    true
                };
                if wrote {
                    inner.touch(key);
                } else {
                    inner.gc_if_empty(key); // hash_mut may have created an empty entry
                }
                Ok(Reply::Bool(wrote))
            }
            Command::HDel { key, fields } => {
                if inner.hash(key)?.is_none() {
                    return Ok(Reply::Int(0));
                }
                let hash = inner.hash_mut(key)?;
                let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();
                if removed > 0 {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(removed as u64))
            }
            Command::HGetAll(key) => Ok(Reply::Pairs(
                inner
                    .hash(key)?
                    .map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
                    .unwrap_or_default(),
            )),
            Command::HKeys(key) => Ok(Reply::Array(
                inner
                    .hash(key)?
                    .map(|h| h.keys().cloned().collect())
                    .unwrap_or_default(),
            )),
            Command::HVals(key) => Ok(Reply::Array(
                inner
                    .hash(key)?
                    .map(|h| h.values().cloned().collect())
                    .unwrap_or_default(),
            )),
            Command::HLen(key) => Ok(Reply::Int(
                inner.hash(key)?.map(|h| h.len() as u64).unwrap_or(0),
            )),
            Command::HExists { key, field } => Ok(Reply::Bool(
                inner
                    .hash(key)?
                    .map(|h| h.contains_key(field))
                    .unwrap_or(false),
            )),
            Command::HMSet { key, entries } => {
                if !entries.is_empty() {
                    let hash = inner.hash_mut(key)?;
                    for (f, v) in entries {
                        hash.insert(f.clone(), v.clone());
                    }
                    inner.touch(key);
                }
                Ok(Reply::Ok)
            }
            Command::HRandField(key) => Ok(inner
                .hash(key)?
                .and_then(|h| h.keys().choose(&mut rand::thread_rng()))
                .map(|f| Reply::Bytes(f.clone()))
                .unwrap_or(Reply::Nil)),

            // ---- list ----
            Command::LRange { key, start, stop } => {
                let list = inner.list(key)?;
                let Some(list) = list else {
                    return Ok(Reply::Array(Vec::new()));
                };
                Ok(Reply::Array(
                    match resolve_range(list.len(), *start, *stop) {
                        Some((lo, hi)) => list.iter().skip(lo).take(hi - lo + 1).cloned().collect(),
                        None => Vec::new(),
                    },
                ))
            }
            Command::LIndex { key, index } => {
                let Some(list) = inner.list(key)? else {
                    return Ok(Reply::Nil);
                };
                let len = list.len() as i64;
                let idx = if *index < 0 { index + len } else { *index };
                if idx < 0 || idx >= len {
                    Ok(Reply::Nil)
                } else {
                    Ok(Reply::Bytes(list[idx as usize].clone()))
                }
            }
            Command::LSet { key, index, value } => {
                let list = inner.list_mut(key)?;
                let len = list.len() as i64;
                let idx = if *index < 0 { index + len } else { *index };
                if idx < 0 || idx >= len {
                    inner.gc_if_empty(key);
                    return Err(Error::Store("index out of range".into()));
                }
                list[idx as usize] = value.clone();
                inner.touch(key);
                Ok(Reply::Ok)
            }
            Command::LLen(key) => Ok(Reply::Int(
                inner.list(key)?.map(|l| l.len() as u64).unwrap_or(0),
            )),
            Command::LPush { key, values } => {
                let list = inner.list_mut(key)?;
                for v in values {
                    list.push_front(v.clone());
                }
                let len = list.len() as u64;
                if values.is_empty() {
                    inner.gc_if_empty(key);
                } else {
                    inner.touch(key);
                }
                Ok(Reply::Int(len))
            }
            Command::RPush { key, values } => {
                let list = inner.list_mut(key)?;
                for v in values {
                    list.push_back(v.clone());
                }
                let len = list.len() as u64;
                if values.is_empty() {
                    inner.gc_if_empty(key);
                } else {
                    inner.touch(key);
                }
                Ok(Reply::Int(len))
            }
            Command::LPop(key) => {
                if inner.list(key)?.is_none() {
                    return Ok(Reply::Nil);
                }
                let list = inner.list_mut(key)?;
                let popped = list.pop_front();
                if popped.is_some() {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(popped.map(Reply::Bytes).unwrap_or(Reply::Nil))
            }
            Command::RPop(key) => {
                if inner.list(key)?.is_none() {
                    return Ok(Reply::Nil);
                }
                let list = inner.list_mut(key)?;
                let popped = list.pop_back();
                if popped.is_some() {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(popped.map(Reply::Bytes).unwrap_or(Reply::Nil))
            }
            Command::LTrim { key, start, stop } => {
                if inner.list(key)?.is_none() {
                    return Ok(Reply::Ok);
                }
                let list = inner.list_mut(key)?;
                let before = list.len();
                match resolve_range(before, *start, *stop) {
                    Some((lo, hi)) => {
                        list.truncate(hi + 1);
                        for _ in 0..lo {
                            list.pop_front();
                        }
                    }
                    None => list.clear(),
                }
                if list.len() != before {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Ok)
            }
            Command::LRem { key, count, value } => {
                if inner.list(key)?.is_none() {
                    return Ok(Reply::Int(0));
                }
                let list = inner.list_mut(key)?;
                let limit = if *count == 0 { usize::MAX } else { *count as usize };
                let mut removed = 0usize;
                let mut kept = VecDeque::with_capacity(list.len());
                for item in list.drain(..) {
                    if removed < limit && item == *value {
                        removed += 1;
                    } else {
                        kept.push_back(item);
                    }
                }
                *list = kept;
                if removed > 0 {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(removed as u64))
            }

            // ---- set ----
            Command::SIsMember { key, member } => Ok(Reply::Bool(
                inner
                    .set(key)?
                    .map(|s| s.contains(member))
                    .unwrap_or(false),
            )),
            Command::SAdd { key, members } => {
                let set = inner.set_mut(key)?;
                let added = members.iter().filter(|m| set.insert((*m).clone())).count();
                if added > 0 {
                    inner.touch(key);
                } else {
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(added as u64))
            }
            Command::SRem { key, members } => {
                if inner.set(key)?.is_none() {
                    return Ok(Reply::Int(0));
                }
                let set = inner.set_mut(key)?;
                let removed = members.iter().filter(|m| set.remove(*m)).count();
                if removed > 0 {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(removed as u64))
            }
            Command::SMembers(key) => Ok(Reply::Array(
                inner
                    .set(key)?
                    .map(|s| s.iter().cloned().collect())
                    .unwrap_or_default(),
            )),
            Command::SCard(key) => Ok(Reply::Int(
                inner.set(key)?.map(|s| s.len() as u64).unwrap_or(0),
            )),
            Command::SPop(key) => {
                if inner.set(key)?.is_none() {
                    return Ok(Reply::Nil);
                }
                let set = inner.set_mut(key)?;
                let member = set.iter().choose(&mut rand::thread_rng()).cloned();
                match member {
                    Some(m) => {
                        set.remove(&m);
                        inner.touch(key);
                        inner.gc_if_empty(key);
                        Ok(Reply::Bytes(m))
                    }
                    None => Ok(Reply::Nil),
                }
            }
            Command::SRandMember { key, count } => Ok(Reply::Array(
                inner
                    .set(key)?
                    .map(|s| {
                        s.iter()
                            .choose_multiple(&mut rand::thread_rng(), *count)
                            .into_iter()
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default(),
            )),
            Command::SUnion(keys) => {
                let mut out: HashSet<Vec<u8>> = HashSet::new();
                for k in keys {
                    if let Some(s) = inner.set(k)? {
                        out.extend(s.iter().cloned());
                    }
                }
                Ok(Reply::Array(out.into_iter().collect()))
            }
            Command::SInter(keys) => Ok(Reply::Array(
                Self::inter(inner, keys)?.into_iter().collect(),
            )),
            Command::SDiff(keys) => Ok(Reply::Array(
                Self::diff(inner, keys)?.into_iter().collect(),
            )),
            Command::SUnionStore { dest, keys } => {
                let mut out: HashSet<Vec<u8>> = HashSet::new();
                for k in keys {
                    if let Some(s) = inner.set(k)? {
                        out.extend(s.iter().cloned());
                    }
                }
                Self::store_set(inner, dest, out)
            }
            Command::SInterStore { dest, keys } => {
                let out = Self::inter(inner, keys)?;
                Self::store_set(inner, dest, out)
            }
            Command::SDiffStore { dest, keys } => {
                let out = Self::diff(inner, keys)?;
                Self::store_set(inner, dest, out)
            }

            // ---- sorted set ----
            Command::ZAdd { key, entries } => {
                if entries.is_empty() {
                    return Ok(Reply::Int(0));
                }
                let zset = inner.zset_mut(key)?;
                let mut added = 0u64;
                let mut changed = false;
                for (m, s) in entries {
                    match zset.insert(m.clone(), *s) {
                        None => {
                            added += 1;
                            changed = true;
                        }
                        Some(old) => {
                            if old.to_bits() != s.to_bits() {
                                changed = true;
                            }
                        }
                    }
                }
                if changed {
                    inner.touch(key);
                } else {
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(added))
            }
            Command::ZScore { key, member } => Ok(inner
                .zset(key)?
                .and_then(|z| z.get(member))
                .map(|s| Reply::Float(*s))
                .unwrap_or(Reply::Nil)),
            Command::ZIncrBy { key, member, delta } => {
                let zset = inner.zset_mut(key)?;
                let score = zset.entry(member.clone()).or_insert(0.0);
                *score += delta;
                let score = *score;
                inner.touch(key);
                Ok(Reply::Float(score))
            }
            Command::ZRem { key, members } => {
                if inner.zset(key)?.is_none() {
                    return Ok(Reply::Int(0));
                }
                let zset = inner.zset_mut(key)?;
                let removed = members.iter().filter(|m| zset.remove(*m).is_some()).count();
                if removed > 0 {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(removed as u64))
            }
            Command::ZCard(key) => Ok(Reply::Int(
                inner.zset(key)?.map(|z| z.len() as u64).unwrap_or(0),
            )),
            Command::ZRank { key, member } => {
                let Some(z) = inner.zset(key)? else {
                    return Ok(Reply::Nil);
                };
                if !z.contains_key(member) {
                    return Ok(Reply::Nil);
                }
                let rank = zset_sorted(z)
                    .iter()
                    .position(|(m, _)| m == member)
                    .expect("member present");
                Ok(Reply::Int(rank as u64))
            }
            Command::ZRevRank { key, member } => {
                let Some(z) = inner.zset(key)? else {
                    return Ok(Reply::Nil);
                };
                if !z.contains_key(member) {
                    return Ok(Reply::Nil);
                }
                let sorted = zset_sorted(z);
                let rank = sorted
                    .iter()
                    .rev()
                    .position(|(m, _)| m == member)
                    .expect("member present");
                Ok(Reply::Int(rank as u64))
            }
            Command::ZRangeWithScores {
                key,
                start,
                stop,
                reverse,
            } => {
                let Some(z) = inner.zset(key)? else {
                    return Ok(Reply::Scored(Vec::new()));
                };
                let mut sorted = zset_sorted(z);
                if *reverse {
                    sorted.reverse();
                }
                Ok(Reply::Scored(
                    match resolve_range(sorted.len(), *start, *stop) {
                        Some((lo, hi)) => sorted[lo..=hi].to_vec(),
                        None => Vec::new(),
                    },
                ))
            }
            Command::ZRangeByScoreWithScores { key, min, max } => {
                let Some(z) = inner.zset(key)? else {
                    return Ok(Reply::Scored(Vec::new()));
                };
                Ok(Reply::Scored(
                    zset_sorted(z)
                        .into_iter()
                        .filter(|(_, s)| s >= min && s <= max)
                        .collect(),
                ))
            }
            Command::ZRemRangeByRank { key, start, stop } => {
                let Some(z) = inner.zset(key)? else {
                    return Ok(Reply::Int(0));
                };
                let sorted = zset_sorted(z);
                let doomed: Vec<Vec<u8>> = match resolve_range(sorted.len(), *start, *stop) {
                    Some((lo, hi)) => sorted[lo..=hi].iter().map(|(m, _)| m.clone()).collect(),
                    None => Vec::new(),
                };
                let zset = inner.zset_mut(key)?;
                let removed = doomed.iter().filter(|m| zset.remove(*m).is_some()).count();
                if removed > 0 {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(removed as u64))
            }
            Command::ZRemRangeByScore { key, min, max } => {
                if inner.zset(key)?.is_none() {
                    return Ok(Reply::Int(0));
                }
                let zset = inner.zset_mut(key)?;
                let doomed: Vec<Vec<u8>> = zset
                    .iter()
                    .filter(|(_, s)| *s >= min && *s <= max)
                    .map(|(m, _)| m.clone())
                    .collect();
                for m in &doomed {
                    zset.remove(m);
                }
                if !doomed.is_empty() {
                    inner.touch(key);
                    inner.gc_if_empty(key);
                }
                Ok(Reply::Int(doomed.len() as u64))
            }
        }
    }

    fn inter(inner: &Inner, keys: &[String]) -> Result<HashSet<Vec<u8>>> {
        let mut iter = keys.iter();
        let Some(first) = iter.next() else {
            return Ok(HashSet::new());
        };
        let mut out: HashSet<Vec<u8>> = match inner.set(first)? {
            Some(s) => s.clone(),
            None => return Ok(HashSet::new()),
        };
        for k in iter {
            match inner.set(k)? {
                Some(s) => out.retain(|m| s.contains(m)),
                None => return Ok(HashSet::new()),
            }
        }
        Ok(out)
    }

    fn diff(inner: &Inner, keys: &[String]) -> Result<HashSet<Vec<u8>>> {
        let mut iter = keys.iter();
        let Some(first) = iter.next() else {
            return Ok(HashSet::new());
        };
        let mut out: HashSet<Vec<u8>> = match inner.set(first)? {
            Some(s) => s.clone(),
            None => return Ok(HashSet::new()),
        };
        for k in iter {
            if let Some(s) = inner.set(k)? {
                out.retain(|m| !s.contains(m));
            }
        }
        Ok(out)
    }

    /// Overwrite `dest` with a computed set result, deleting it when the
    /// result is empty (the modeled store never keeps empty structures).
    fn store_set(inner: &mut Inner, dest: &str, members: HashSet<Vec<u8>>) -> Result<Reply> {
        let card = members.len() as u64;
        inner.remove_key(dest);
        if !members.is_empty() {
            *inner.set_mut(dest)? = members;
            inner.touch(dest);
        }
        Ok(Reply::Int(card))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("keys", &inner.keyspace.len())
            .field("clock", &inner.clock)
            .finish()
    }
}

impl StoreBackend for MemoryStore {
    fn execute(&self, cmd: Command) -> Result<Reply> {
        let mut inner = self.inner.lock();
        Self::apply(&mut inner, &cmd)
    }

    fn exec_atomic(&self, cmds: &[Command]) -> Result<Vec<Reply>> {
        let mut inner = self.inner.lock();
        let mut replies = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            replies.push(Self::apply(&mut inner, cmd)?);
        }
        Ok(replies)
    }

    fn watch(&self, keys: &[String]) -> Result<WatchToken> {
        let mut inner = self.inner.lock();
        let observed = keys
            .iter()
            .map(|k| (k.clone(), inner.observed_version(k)))
            .collect();
        inner.next_token += 1;
        let token = inner.next_token;
        inner.watches.insert(token, observed);
        Ok(WatchToken(token))
    }

    fn exec_watched(&self, token: WatchToken, cmds: &[Command]) -> Result<Option<Vec<Reply>>> {
        let mut inner = self.inner.lock();
        let observed = inner
            .watches
            .remove(&token.0)
            .ok_or_else(|| Error::Protocol(format!("unknown watch token {}", token.0)))?;
        let conflicted = observed
            .iter()
            .any(|(key, version)| inner.observed_version(key) != *version);
        if conflicted {
            tracing::trace!(token = token.0, "watched commit rejected, keys changed");
            return Ok(None);
        }
        let mut replies = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            replies.push(Self::apply(&mut inner, cmd)?);
        }
        Ok(Some(replies))
    }

    fn unwatch(&self, token: WatchToken) {
        self.inner.lock().watches.remove(&token.0);
    }
}

// ============================================================================
// Tests
// ============================================================================
