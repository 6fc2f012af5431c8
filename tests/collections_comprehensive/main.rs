//! Comprehensive integration suite for the collection adapters
//!
//! Covers the full public surface through the `Tether` facade: per-adapter
//! behavior, transactional compound operations under contention, cross-
//! collection dispatch (with call-count instrumentation on the backend),
//! and the write-back cache contract.

mod common;

mod cache_ops;
mod counter_ops;
mod interop;
mod list_ops;
mod map_ops;
mod scenarios;
mod set_ops;
mod transactions;
