//! The transport trait every store backend implements
//!
//! Three levels of atomicity, matching the modeled store exactly:
//!
//! 1. [`StoreBackend::execute`] - one command, atomic on its own
//! 2. [`StoreBackend::exec_atomic`] - a batch applied with no interleaving
//!    from other clients (the store's queued-execution primitive). As in the
//!    modeled store, a runtime error part-way through the batch does NOT
//!    roll back earlier commands; batches must be constructed so that
//!    runtime errors are impossible (right structure kind, valid indices).
//! 3. [`StoreBackend::watch`] + [`StoreBackend::exec_watched`] - the
//!    optimistic lock: the batch applies only if none of the watched keys
//!    changed since the watch began.
//!
//! Everything above this trait (transaction engine, adapters) is backend
//! agnostic.

use crate::command::{Command, Reply};
use tether_core::Result;

/// Opaque handle for one in-progress watch.
///
/// Minted by [`StoreBackend::watch`], consumed by exactly one
/// [`StoreBackend::exec_watched`] or [`StoreBackend::unwatch`] call.
/// Dropping a token without either leaks the watch on backends that track
/// them, so the engine always terminates watches explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchToken(pub u64);

/// A remote store capable of executing the tether command surface.
pub trait StoreBackend: Send + Sync {
    /// Execute one command. Atomic with respect to all other clients.
    fn execute(&self, cmd: Command) -> Result<Reply>;

    /// Execute a batch with no interleaving from other clients.
    fn exec_atomic(&self, cmds: &[Command]) -> Result<Vec<Reply>>;

    /// Begin watching keys for the optimistic-lock protocol.
    ///
    /// The returned token captures "the state of these keys as of now";
    /// a later [`StoreBackend::exec_watched`] with the token commits only
    /// if that state is still current.
    fn watch(&self, keys: &[String]) -> Result<WatchToken>;

    /// Atomically verify the watch and apply the batch.
    ///
    /// Returns `Ok(None)` when any watched key changed since
    /// [`StoreBackend::watch`] - nothing was applied and the token is
    /// spent. Returns `Ok(Some(replies))` on commit. The verify-and-apply
    /// step is a single atomic action on the backend; that atomicity is
    /// what the whole transaction layer rests on.
    fn exec_watched(&self, token: WatchToken, cmds: &[Command]) -> Result<Option<Vec<Reply>>>;

    /// Abandon a watch without committing anything.
    fn unwatch(&self, token: WatchToken);
}
