//! Remote store interface for tether
//!
//! This crate pins down the contract between the collection adapters and
//! the remote key-value store:
//!
//! - [`Command`] / [`Reply`]: the per-structure command surface the core
//!   uses (hash, list, set, sorted set, key ops)
//! - [`StoreBackend`]: the transport trait - single atomic commands, atomic
//!   batches, and the watch/commit optimistic-lock primitive
//! - [`Connection`]: a cheap-clone handle adding typed helpers over the raw
//!   command surface
//! - [`MemoryStore`]: an in-process reference backend with full watch
//!   semantics, used by the test suite and the facade's in-memory mode
//!
//! The wire protocol of a networked backend is out of scope; anything that
//! can execute the command surface and honor the watch contract can sit
//! behind [`StoreBackend`].

pub mod backend;
pub mod command;
pub mod connection;
pub mod memory;

pub use backend::{StoreBackend, WatchToken};
pub use command::{Command, Reply};
pub use connection::Connection;
pub use memory::MemoryStore;
