//! Optimistic transaction engine
//!
//! This crate implements the read-decide-write protocol every compound
//! collection operation runs on:
//!
//! 1. Watch the keys the decision depends on
//! 2. Read current state (the watch pins the snapshot)
//! 3. Decide, staging write commands locally
//! 4. Commit the staged batch conditionally: if any watched key changed
//!    since step 1, nothing is applied and the whole body re-runs
//!
//! A conflicted commit is invisible to callers - the engine retries the
//! body until it commits cleanly (or a configured [`RetryPolicy`] cap runs
//! out, which surfaces as `Error::Conflict`). A body that returns an error
//! aborts the transaction: the watch is dropped, nothing is written, the
//! error propagates unchanged.
//!
//! The engine holds no lock of its own. The store's verify-and-apply step
//! is the single atomic primitive; two local threads racing on the same
//! remote key are no different from two independent remote clients.

#![warn(missing_docs)]

pub mod engine;
pub mod retry;

pub use engine::{run, Txn};
pub use retry::RetryPolicy;
