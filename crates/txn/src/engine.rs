//! The watch/read/stage/commit loop

use crate::retry::RetryPolicy;
use tether_core::{Error, Result};
use tether_store::{Command, Connection};

/// Transactional context handed to a transaction body.
///
/// Reads go through the typed helpers below and observe the snapshot
/// pinned by the watch. Writes are staged with [`Txn::stage`] and applied
/// all-or-nothing at commit. The body must finish reading before it starts
/// staging: once a write is staged, further reads would see state the
/// commit check does not cover, so they are rejected in debug builds.
pub struct Txn<'a> {
    conn: &'a Connection,
    staged: Vec<Command>,
}

impl<'a> Txn<'a> {
    fn new(conn: &'a Connection) -> Self {
        Txn {
            conn,
            staged: Vec::new(),
        }
    }

    /// Queue a write command for the atomic commit.
    pub fn stage(&mut self, cmd: Command) {
        self.staged.push(cmd);
    }

    /// Number of staged commands so far.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn read_guard(&self) {
        debug_assert!(
            self.staged.is_empty(),
            "transaction reads must happen before staging writes"
        );
    }

    // ---- read phase: hash ----

    /// Read one hash field.
    pub fn hget(&self, key: &str, field: &[u8]) -> Result<Option<Vec<u8>>> {
        self.read_guard();
        self.conn.hget(key, field)
    }

    /// All field/value pairs of a hash.
    pub fn hgetall(&self, key: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.read_guard();
        self.conn.hgetall(key)
    }

    /// Number of hash fields.
    pub fn hlen(&self, key: &str) -> Result<u64> {
        self.read_guard();
        self.conn.hlen(key)
    }

    /// One arbitrary hash field name.
    pub fn hrandfield(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read_guard();
        self.conn.hrandfield(key)
    }

    // ---- read phase: list ----

    /// List length.
    pub fn llen(&self, key: &str) -> Result<u64> {
        self.read_guard();
        self.conn.llen(key)
    }

    /// Read one list index.
    pub fn lindex(&self, key: &str, index: i64) -> Result<Option<Vec<u8>>> {
        self.read_guard();
        self.conn.lindex(key, index)
    }

    /// Read an inclusive list range.
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        self.read_guard();
        self.conn.lrange(key, start, stop)
    }

    // ---- read phase: set ----

    /// All members of a set.
    pub fn smembers(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        self.read_guard();
        self.conn.smembers(key)
    }

    /// Set cardinality.
    pub fn scard(&self, key: &str) -> Result<u64> {
        self.read_guard();
        self.conn.scard(key)
    }

    /// Set membership test.
    pub fn sismember(&self, key: &str, member: &[u8]) -> Result<bool> {
        self.read_guard();
        self.conn.sismember(key, member)
    }

    /// Union of the named sets.
    pub fn sunion(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.read_guard();
        self.conn.sunion(keys)
    }

    /// Intersection of the named sets.
    pub fn sinter(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.read_guard();
        self.conn.sinter(keys)
    }

    /// Difference of the named sets.
    pub fn sdiff(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>> {
        self.read_guard();
        self.conn.sdiff(keys)
    }

    // ---- read phase: sorted set ----

    /// Read one member's score.
    pub fn zscore(&self, key: &str, member: &[u8]) -> Result<Option<f64>> {
        self.read_guard();
        self.conn.zscore(key, member)
    }

    /// Sorted-set cardinality.
    pub fn zcard(&self, key: &str) -> Result<u64> {
        self.read_guard();
        self.conn.zcard(key)
    }

    /// Inclusive rank range with scores.
    pub fn zrange_withscores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        reverse: bool,
    ) -> Result<Vec<(Vec<u8>, f64)>> {
        self.read_guard();
        self.conn.zrange_withscores(key, start, stop, reverse)
    }
}

/// Run a read-decide-write body with all-or-nothing semantics.
///
/// `watched` names every key the body's decision depends on - reads of
/// unwatched keys are not covered by the conflict check. The body may be
/// re-invoked any number of times; it must compute purely from its reads
/// (no side effects besides staging).
///
/// A body that stages nothing still commits an empty batch, so the watch
/// validates that the multi-key snapshot it read was consistent - this is
/// how read-only compound checks (set comparisons) get their consistency.
///
/// ## Errors
///
/// - body errors propagate unchanged after the watch is dropped (abort:
///   nothing written, no retry)
/// - `Error::Conflict` when a capped [`RetryPolicy`] runs out of attempts
/// - transport errors abandon the transaction whole; a commit either
///   happened entirely or not at all, per the backend contract
pub fn run<T>(
    conn: &Connection,
    watched: &[String],
    policy: &RetryPolicy,
    mut body: impl FnMut(&mut Txn<'_>) -> Result<T>,
) -> Result<T> {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let token = conn.watch(watched)?;
        let mut txn = Txn::new(conn);
        let value = match body(&mut txn) {
            Ok(value) => value,
            Err(err) => {
                conn.unwatch(token);
                return Err(err);
            }
        };
        match conn.exec_watched(token, &txn.staged)? {
            Some(_) => return Ok(value),
            None => {
                tracing::debug!(attempts, ?watched, "transaction conflict, restarting body");
                if let Some(max) = policy.max_attempts() {
                    if attempts >= max {
                        tracing::warn!(attempts, ?watched, "transaction retry budget exhausted");
                        return Err(Error::Conflict { attempts });
                    }
                }
                if let Some(delay) = policy.backoff_delay() {
                    std::thread::sleep(delay);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
