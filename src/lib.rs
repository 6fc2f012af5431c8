//! # tetherdb
//!
//! Remote-backed collections with optimistic transactions.
//!
//! tetherdb exposes familiar in-memory collection semantics - mapping,
//! sequence, set, sorted counter - while every byte of state lives in a
//! remote key-value store. Single-step operations map to single store
//! commands; compound operations (get-then-delete, move between
//! structures, consistent bulk copies) run on a watch/retry transaction
//! engine so they commit all-or-nothing even with other clients mutating
//! the same keys.
//!
//! ## Quick Start
//!
//! ```
//! use tetherdb::prelude::*;
//!
//! # fn main() -> tetherdb::Result<()> {
//! // An in-process store; swap in any StoreBackend for production
//! let db = Tether::in_memory();
//!
//! let map = db.map()?;
//! map.set(&Value::from("user"), &Value::from("alice"))?;
//! assert_eq!(map.get(&Value::from("user"))?, Some(Value::from("alice")));
//!
//! let scores = db.sorted_counter()?;
//! scores.increment_score(&Value::from("alice"), 2.0)?;
//! assert_eq!(scores.get_rank(&Value::from("alice"), false)?, Some(0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Collections
//!
//! - [`RemoteMap`] - field -> value over a remote hash
//! - [`RemoteList`] - ordered sequence over a remote list
//! - [`RemoteSet`] - unique elements over a remote set
//! - [`SortedCounter`] - member -> score over a remote sorted set
//! - [`CachedMap`] - a map with a local write-back staging tier
//!
//! Collections created through one [`Tether`] client share its connection,
//! codec, namespace, and retry policy. Two handles with the same key on
//! the same backend are views of the same remote data.

#![warn(missing_docs)]

mod client;

pub mod prelude;

pub use client::{Tether, TetherBuilder};

// Re-export the vocabulary crates under one roof
pub use tether_core::{Codec, Error, JsonCodec, MsgPackCodec, Namespace, Result, Value};

pub use tether_collections::{
    CachedMap, CounterSource, Handle, ListSource, MapSource, OperandClass, RemoteList, RemoteMap,
    RemoteSet, SetSource, SortedCounter, WriteBackCache,
};

pub use tether_store::{Command, Connection, MemoryStore, Reply, StoreBackend};

pub use tether_txn::RetryPolicy;
