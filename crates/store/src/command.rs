//! Store command and reply surface
//!
//! One enum per direction. [`Command`] enumerates exactly the store
//! primitives the collection adapters use; [`Reply`] enumerates the shapes
//! a backend may answer with. Values and hash fields are opaque byte
//! strings here - the codec boundary lives above this crate.
//!
//! Reply conventions follow the modeled store:
//!
//! | Command family | Reply |
//! |---|---|
//! | single-value reads (`HGet`, `LIndex`, `LPop`, ...) | `Bytes` or `Nil` |
//! | counts and lengths (`HLen`, `SAdd`, `LRem`, ...) | `Int` |
//! | score reads (`ZScore`) | `Float` or `Nil` |
//! | rank reads (`ZRank`, `ZRevRank`) | `Int` or `Nil` |
//! | multi-value reads (`SMembers`, `LRange`, ...) | `Array` |
//! | field/value enumeration (`HGetAll`) | `Pairs` |
//! | scored ranges (`ZRange*WithScores`) | `Scored` |
//! | fire-and-forget writes (`HMSet`, `LTrim`, ...) | `Ok` |

use tether_core::{Error, Result};

/// A single store command.
///
/// Every variant maps to one native command of the modeled store. Commands
/// are self-contained (no connection state) so they can be queued into
/// atomic batches and watched transactions.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ---- key ops ----
    /// Does the key exist (with any structure kind)?
    Exists(String),
    /// Delete a key and its entire structure.
    Del(String),

    // ---- hash ----
    /// Read one hash field.
    HGet {
        /// Hash key
        key: String,
        /// Field name (encoded)
        field: Vec<u8>,
    },
    /// Unconditionally set one hash field.
    HSet {
        /// Hash key
        key: String,
        /// Field name (encoded)
        field: Vec<u8>,
        /// Field value (encoded)
        value: Vec<u8>,
    },
    /// Set one hash field only if it does not exist yet.
    HSetNx {
        /// Hash key
        key: String,
        /// Field name (encoded)
        field: Vec<u8>,
        /// Field value (encoded)
        value: Vec<u8>,
    },
    /// Delete hash fields; replies with the number actually removed.
    HDel {
        /// Hash key
        key: String,
        /// Field names to remove
        fields: Vec<Vec<u8>>,
    },
    /// Enumerate all field/value pairs.
    HGetAll(String),
    /// Enumerate all field names.
    HKeys(String),
    /// Enumerate all field values.
    HVals(String),
    /// Number of fields.
    HLen(String),
    /// Does a field exist?
    HExists {
        /// Hash key
        key: String,
        /// Field name (encoded)
        field: Vec<u8>,
    },
    /// Set many fields in one round trip.
    HMSet {
        /// Hash key
        key: String,
        /// Field/value pairs (encoded)
        entries: Vec<(Vec<u8>, Vec<u8>)>,
    },
    /// One arbitrary field name, or nil when the hash is empty.
    HRandField(String),

    // ---- list ----
    /// Read the inclusive index range `start..=stop` (negative from tail).
    LRange {
        /// List key
        key: String,
        /// Start index, inclusive
        start: i64,
        /// Stop index, inclusive
        stop: i64,
    },
    /// Read one index, nil when out of bounds.
    LIndex {
        /// List key
        key: String,
        /// Index (negative from tail)
        index: i64,
    },
    /// Overwrite one index; out of bounds is a store error.
    LSet {
        /// List key
        key: String,
        /// Index (negative from tail)
        index: i64,
        /// New element (encoded)
        value: Vec<u8>,
    },
    /// List length.
    LLen(String),
    /// Prepend elements; replies with the new length.
    LPush {
        /// List key
        key: String,
        /// Elements, pushed left-to-right (so the last ends up first)
        values: Vec<Vec<u8>>,
    },
    /// Append elements; replies with the new length.
    RPush {
        /// List key
        key: String,
        /// Elements, appended in order
        values: Vec<Vec<u8>>,
    },
    /// Remove and return the first element, nil when empty.
    LPop(String),
    /// Remove and return the last element, nil when empty.
    RPop(String),
    /// Keep only the inclusive range `start..=stop`, dropping the rest.
    LTrim {
        /// List key
        key: String,
        /// Start index, inclusive
        start: i64,
        /// Stop index, inclusive
        stop: i64,
    },
    /// Remove up to `count` occurrences of `value` from the head (`0`
    /// removes every occurrence); replies with the number removed.
    LRem {
        /// List key
        key: String,
        /// Maximum occurrences to remove from the head; `0` for all
        count: u64,
        /// Element to match (encoded)
        value: Vec<u8>,
    },

    // ---- set ----
    /// Membership test.
    SIsMember {
        /// Set key
        key: String,
        /// Member (encoded)
        member: Vec<u8>,
    },
    /// Add members; replies with the number newly added.
    SAdd {
        /// Set key
        key: String,
        /// Members (encoded)
        members: Vec<Vec<u8>>,
    },
    /// Remove members; replies with the number actually removed.
    SRem {
        /// Set key
        key: String,
        /// Members (encoded)
        members: Vec<Vec<u8>>,
    },
    /// Enumerate all members.
    SMembers(String),
    /// Cardinality.
    SCard(String),
    /// Remove and return one arbitrary member, nil when empty.
    SPop(String),
    /// Up to `count` distinct random members, without removal.
    SRandMember {
        /// Set key
        key: String,
        /// Maximum number of members to return
        count: usize,
    },
    /// Union of the named sets.
    SUnion(Vec<String>),
    /// Intersection of the named sets.
    SInter(Vec<String>),
    /// Difference: first set minus all the rest.
    SDiff(Vec<String>),
    /// Union stored under `dest`; replies with the result cardinality.
    SUnionStore {
        /// Destination key (overwritten)
        dest: String,
        /// Source keys
        keys: Vec<String>,
    },
    /// Intersection stored under `dest`.
    SInterStore {
        /// Destination key (overwritten)
        dest: String,
        /// Source keys
        keys: Vec<String>,
    },
    /// Difference stored under `dest`.
    SDiffStore {
        /// Destination key (overwritten)
        dest: String,
        /// Source keys
        keys: Vec<String>,
    },

    // ---- sorted set ----
    /// Set member scores; replies with the number of members newly added.
    ZAdd {
        /// Sorted-set key
        key: String,
        /// Member/score pairs
        entries: Vec<(Vec<u8>, f64)>,
    },
    /// Read one member's score, nil when absent.
    ZScore {
        /// Sorted-set key
        key: String,
        /// Member (encoded)
        member: Vec<u8>,
    },
    /// Add `delta` to a member's score (creating it at `delta`); replies
    /// with the new score.
    ZIncrBy {
        /// Sorted-set key
        key: String,
        /// Member (encoded)
        member: Vec<u8>,
        /// Score delta
        delta: f64,
    },
    /// Remove members; replies with the number actually removed.
    ZRem {
        /// Sorted-set key
        key: String,
        /// Members (encoded)
        members: Vec<Vec<u8>>,
    },
    /// Cardinality.
    ZCard(String),
    /// Ascending rank of a member, nil when absent.
    ZRank {
        /// Sorted-set key
        key: String,
        /// Member (encoded)
        member: Vec<u8>,
    },
    /// Descending rank of a member, nil when absent.
    ZRevRank {
        /// Sorted-set key
        key: String,
        /// Member (encoded)
        member: Vec<u8>,
    },
    /// Members with scores in the inclusive rank range `start..=stop`.
    ZRangeWithScores {
        /// Sorted-set key
        key: String,
        /// Start rank, inclusive (negative from tail)
        start: i64,
        /// Stop rank, inclusive (negative from tail)
        stop: i64,
        /// Walk highest-score-first when true
        reverse: bool,
    },
    /// Members with scores in the inclusive score range `min..=max`.
    ZRangeByScoreWithScores {
        /// Sorted-set key
        key: String,
        /// Minimum score, inclusive
        min: f64,
        /// Maximum score, inclusive
        max: f64,
    },
    /// Remove the inclusive rank range; replies with the number removed.
    ZRemRangeByRank {
        /// Sorted-set key
        key: String,
        /// Start rank, inclusive
        start: i64,
        /// Stop rank, inclusive
        stop: i64,
    },
    /// Remove the inclusive score range; replies with the number removed.
    ZRemRangeByScore {
        /// Sorted-set key
        key: String,
        /// Minimum score, inclusive
        min: f64,
        /// Maximum score, inclusive
        max: f64,
    },
}

impl Command {
    /// Short command name for logs and protocol errors.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Exists(_) => "EXISTS",
            Command::Del(_) => "DEL",
            Command::HGet { .. } => "HGET",
            Command::HSet { .. } => "HSET",
            Command::HSetNx { .. } => "HSETNX",
            Command::HDel { .. } => "HDEL",
            Command::HGetAll(_) => "HGETALL",
            Command::HKeys(_) => "HKEYS",
            Command::HVals(_) => "HVALS",
            Command::HLen(_) => "HLEN",
            Command::HExists { .. } => "HEXISTS",
            Command::HMSet { .. } => "HMSET",
            Command::HRandField(_) => "HRANDFIELD",
            Command::LRange { .. } => "LRANGE",
            Command::LIndex { .. } => "LINDEX",
            Command::LSet { .. } => "LSET",
            Command::LLen(_) => "LLEN",
            Command::LPush { .. } => "LPUSH",
            Command::RPush { .. } => "RPUSH",
            Command::LPop(_) => "LPOP",
            Command::RPop(_) => "RPOP",
            Command::LTrim { .. } => "LTRIM",
            Command::LRem { .. } => "LREM",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SMembers(_) => "SMEMBERS",
            Command::SCard(_) => "SCARD",
            Command::SPop(_) => "SPOP",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SUnion(_) => "SUNION",
            Command::SInter(_) => "SINTER",
            Command::SDiff(_) => "SDIFF",
            Command::SUnionStore { .. } => "SUNIONSTORE",
            Command::SInterStore { .. } => "SINTERSTORE",
            Command::SDiffStore { .. } => "SDIFFSTORE",
            Command::ZAdd { .. } => "ZADD",
            Command::ZScore { .. } => "ZSCORE",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::ZRem { .. } => "ZREM",
            Command::ZCard(_) => "ZCARD",
            Command::ZRank { .. } => "ZRANK",
            Command::ZRevRank { .. } => "ZREVRANK",
            Command::ZRangeWithScores { .. } => "ZRANGE",
            Command::ZRangeByScoreWithScores { .. } => "ZRANGEBYSCORE",
            Command::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
        }
    }
}

/// A backend's answer to one [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Missing value (failed single-value read)
    Nil,
    /// Fire-and-forget write acknowledged
    Ok,
    /// Boolean outcome
    Bool(bool),
    /// Count, length, or rank
    Int(u64),
    /// Score
    Float(f64),
    /// Single value or field
    Bytes(Vec<u8>),
    /// Multiple values or members
    Array(Vec<Vec<u8>>),
    /// Field/value enumeration
    Pairs(Vec<(Vec<u8>, Vec<u8>)>),
    /// Member/score range
    Scored(Vec<(Vec<u8>, f64)>),
}

fn unexpected(want: &'static str, got: &Reply) -> Error {
    Error::Protocol(format!("expected {} reply, got {:?}", want, got))
}

impl Reply {
    /// Unwrap an acknowledgement.
    pub fn into_ok(self) -> Result<()> {
        match self {
            Reply::Ok => Ok(()),
            other => Err(unexpected("Ok", &other)),
        }
    }

    /// Unwrap a boolean outcome.
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Reply::Bool(b) => Ok(b),
            other => Err(unexpected("Bool", &other)),
        }
    }

    /// Unwrap a count, length, or rank.
    pub fn into_uint(self) -> Result<u64> {
        match self {
            Reply::Int(n) => Ok(n),
            other => Err(unexpected("Int", &other)),
        }
    }

    /// Unwrap a score.
    pub fn into_float(self) -> Result<f64> {
        match self {
            Reply::Float(f) => Ok(f),
            other => Err(unexpected("Float", &other)),
        }
    }

    /// Unwrap a single-value read that may miss.
    pub fn into_opt_bytes(self) -> Result<Option<Vec<u8>>> {
        match self {
            Reply::Nil => Ok(None),
            Reply::Bytes(b) => Ok(Some(b)),
            other => Err(unexpected("Bytes or Nil", &other)),
        }
    }

    /// Unwrap a score read that may miss.
    pub fn into_opt_float(self) -> Result<Option<f64>> {
        match self {
            Reply::Nil => Ok(None),
            Reply::Float(f) => Ok(Some(f)),
            other => Err(unexpected("Float or Nil", &other)),
        }
    }

    /// Unwrap a rank read that may miss.
    pub fn into_opt_uint(self) -> Result<Option<u64>> {
        match self {
            Reply::Nil => Ok(None),
            Reply::Int(n) => Ok(Some(n)),
            other => Err(unexpected("Int or Nil", &other)),
        }
    }

    /// Unwrap a multi-value read.
    pub fn into_array(self) -> Result<Vec<Vec<u8>>> {
        match self {
            Reply::Array(a) => Ok(a),
            other => Err(unexpected("Array", &other)),
        }
    }

    /// Unwrap a field/value enumeration.
    pub fn into_pairs(self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        match self {
            Reply::Pairs(p) => Ok(p),
            other => Err(unexpected("Pairs", &other)),
        }
    }

    /// Unwrap a member/score range.
    pub fn into_scored(self) -> Result<Vec<(Vec<u8>, f64)>> {
        match self {
            Reply::Scored(s) => Ok(s),
            other => Err(unexpected("Scored", &other)),
        }
    }
}
