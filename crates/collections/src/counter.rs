//! Sorted counter adapter over a remote sorted set
//!
//! Maps members to floating-point scores, kept ordered by score (ties
//! break on encoded member bytes, matching the store). Score reads and
//! writes are single commands; `get_or_set_score` and consistent bulk
//! copies run on the transaction engine.
//!
//! Rank queries return an `Option` - "no rank" is a sentinel, distinct
//! from rank 0, never an error.

use crate::handle::Handle;
use crate::operand::OperandClass;
use tether_core::{Error, Result, Value};
use tether_store::Command;
use tether_txn as txn;

/// Source for a bulk [`SortedCounter::update`].
pub enum CounterSource<'a> {
    /// Another remote-backed counter.
    Remote(&'a SortedCounter),
    /// In-process member/score pairs. Scores must be `Int` or `Float`
    /// values; anything else fails the capability check before any remote
    /// call is made.
    Pairs(&'a [(Value, Value)]),
}

/// A member -> score mapping stored in a remote sorted set.
#[derive(Debug, Clone)]
pub struct SortedCounter {
    handle: Handle,
}

impl SortedCounter {
    /// Wrap a handle.
    pub fn new(handle: Handle) -> Self {
        SortedCounter { handle }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn key(&self) -> &str {
        self.handle.key()
    }

    /// Number of members. Single remote command.
    pub fn len(&self) -> Result<u64> {
        self.handle.connection().zcard(self.key())
    }

    /// Is the counter empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Membership test. Single remote command.
    pub fn contains(&self, member: &Value) -> Result<bool> {
        Ok(self.get_score(member)?.is_some())
    }

    /// Set a member's score, creating the member as needed. Single remote
    /// command.
    pub fn set_score(&self, member: &Value, score: f64) -> Result<()> {
        let encoded = self.handle.encode(member)?;
        self.handle.connection().zadd(self.key(), vec![(encoded, score)])?;
        Ok(())
    }

    /// Read a member's score; `None` when absent. Single remote command.
    pub fn get_score(&self, member: &Value) -> Result<Option<f64>> {
        let encoded = self.handle.encode(member)?;
        self.handle.connection().zscore(self.key(), &encoded)
    }

    /// Add `delta` to a member's score, creating it at `delta`; returns
    /// the new score. Single remote command.
    pub fn increment_score(&self, member: &Value, delta: f64) -> Result<f64> {
        let encoded = self.handle.encode(member)?;
        self.handle.connection().zincrby(self.key(), encoded, delta)
    }

    /// Remove one member, failing with `NotFound` when absent.
    pub fn remove_member(&self, member: &Value) -> Result<()> {
        let encoded = self.handle.encode(member)?;
        let removed = self.handle.connection().zrem(self.key(), vec![encoded])?;
        if removed == 0 {
            return Err(Error::NotFound(format!("{:?}", member)));
        }
        Ok(())
    }

    /// Remove one member if present. Idempotent, never fails on absence.
    pub fn discard_member(&self, member: &Value) -> Result<()> {
        let encoded = self.handle.encode(member)?;
        self.handle.connection().zrem(self.key(), vec![encoded])?;
        Ok(())
    }

    /// Position of a member in score order - ascending by default,
    /// descending with `reverse`. Returns `None` (not an error) when the
    /// member has no rank; rank 0 is the first position.
    pub fn get_rank(&self, member: &Value, reverse: bool) -> Result<Option<u64>> {
        let encoded = self.handle.encode(member)?;
        if reverse {
            self.handle.connection().zrevrank(self.key(), &encoded)
        } else {
            self.handle.connection().zrank(self.key(), &encoded)
        }
    }

    /// Set `default` as the member's score if it has none, then return the
    /// current score.
    ///
    /// Runs as a transaction: present members are returned with no write
    /// at all; absent members get exactly one conditional write.
    pub fn get_or_set_score(&self, member: &Value, default: f64) -> Result<f64> {
        let key = self.key().to_string();
        let encoded = self.handle.encode(member)?;
        let handle = &self.handle;
        txn::run(
            handle.connection(),
            std::slice::from_ref(&key),
            handle.retry(),
            |t| match t.zscore(&key, &encoded)? {
                Some(existing) => Ok(existing),
                None => {
                    t.stage(Command::ZAdd {
                        key: key.clone(),
                        entries: vec![(encoded.clone(), default)],
                    });
                    Ok(default)
                }
            },
        )
    }

    /// Members in the inclusive rank range `start..=stop` (negative from
    /// the tail), with scores. Single native range command.
    pub fn range_by_rank(&self, start: i64, stop: i64, reverse: bool) -> Result<Vec<(Value, f64)>> {
        self.decode_scored(
            self.handle
                .connection()
                .zrange_withscores(self.key(), start, stop, reverse)?,
        )
    }

    /// Members with scores in the inclusive range `min..=max`, ascending.
    /// Single native range command.
    pub fn range_by_score(&self, min: f64, max: f64) -> Result<Vec<(Value, f64)>> {
        self.decode_scored(
            self.handle
                .connection()
                .zrangebyscore_withscores(self.key(), min, max)?,
        )
    }

    /// Members in the rank range whose scores also fall in `min..=max`.
    ///
    /// No native command combines both bounds: the rank-bounded range is
    /// fetched remotely, then filtered by score locally.
    pub fn range_by_rank_and_score(
        &self,
        start: i64,
        stop: i64,
        min: f64,
        max: f64,
        reverse: bool,
    ) -> Result<Vec<(Value, f64)>> {
        let ranked = self
            .handle
            .connection()
            .zrange_withscores(self.key(), start, stop, reverse)?;
        self.decode_scored(
            ranked
                .into_iter()
                .filter(|(_, s)| *s >= min && *s <= max)
                .collect(),
        )
    }

    /// All members with scores, ascending. One remote enumeration.
    pub fn items(&self) -> Result<Vec<(Value, f64)>> {
        self.range_by_rank(0, -1, false)
    }

    /// Bulk-set scores from another counter or from in-process pairs.
    ///
    /// A remote source on this counter's backend is read inside one
    /// transaction spanning both keys, so every copied pair reflects a
    /// single point in time; reads complete before any write begins.
    pub fn update(&self, source: CounterSource<'_>) -> Result<()> {
        match source {
            CounterSource::Pairs(pairs) => {
                let entries = self.convert_pairs(pairs)?;
                if entries.is_empty() {
                    return Ok(());
                }
                self.handle.connection().zadd(self.key(), entries)?;
                Ok(())
            }
            CounterSource::Remote(other) => {
                let class = OperandClass::classify(
                    self.handle.connection(),
                    Some(other.handle.connection()),
                );
                match class {
                    OperandClass::RemoteSameConn => self.update_from_same_backend(other),
                    _ => {
                        let items = other.items()?;
                        let pairs: Vec<(Value, Value)> = items
                            .into_iter()
                            .map(|(m, s)| (m, Value::Float(s)))
                            .collect();
                        self.update(CounterSource::Pairs(&pairs))
                    }
                }
            }
        }
    }

    fn update_from_same_backend(&self, other: &SortedCounter) -> Result<()> {
        let dest = self.key().to_string();
        let src = other.key().to_string();
        let watched = vec![dest.clone(), src.clone()];
        let handle = &self.handle;
        txn::run(handle.connection(), &watched, handle.retry(), |t| {
            let raw = t.zrange_withscores(&src, 0, -1, false)?;
            if raw.is_empty() {
                return Ok(());
            }
            // re-encode through this counter's codec in case the source
            // handle encodes differently
            let mut entries = Vec::with_capacity(raw.len());
            for (member, score) in raw {
                let value = other.handle.decode(&member)?;
                entries.push((handle.encode(&value)?, score));
            }
            t.stage(Command::ZAdd {
                key: dest.clone(),
                entries,
            });
            Ok(())
        })
    }

    /// Remove the inclusive rank range; number of members removed.
    pub fn trim_by_rank(&self, start: i64, stop: i64) -> Result<u64> {
        self.handle.connection().zremrangebyrank(self.key(), start, stop)
    }

    /// Remove the inclusive score range; number of members removed.
    pub fn trim_by_score(&self, min: f64, max: f64) -> Result<u64> {
        self.handle.connection().zremrangebyscore(self.key(), min, max)
    }

    /// Delete every member (and the remote key).
    pub fn clear(&self) -> Result<()> {
        self.handle.clear()
    }

    fn decode_scored(&self, raw: Vec<(Vec<u8>, f64)>) -> Result<Vec<(Value, f64)>> {
        raw.iter()
            .map(|(m, s)| Ok((self.handle.decode(m)?, *s)))
            .collect()
    }

    fn convert_pairs(&self, pairs: &[(Value, Value)]) -> Result<Vec<(Vec<u8>, f64)>> {
        pairs
            .iter()
            .map(|(member, score)| {
                let score = match score {
                    Value::Float(f) => *f,
                    Value::Int(i) => *i as f64,
                    other => {
                        return Err(Error::TypeMismatch {
                            expected: "numeric score",
                            actual: other.type_name(),
                        })
                    }
                };
                Ok((self.handle.encode(member)?, score))
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
