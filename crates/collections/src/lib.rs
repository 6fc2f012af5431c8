//! Remote-backed collection adapters
//!
//! Each adapter maps a familiar collection onto one native structure of
//! the remote store:
//!
//! | Adapter | Remote structure | Feels like |
//! |---|---|---|
//! | [`RemoteMap`] | hash | `HashMap<Value, Value>` |
//! | [`RemoteList`] | list | `Vec<Value>` |
//! | [`RemoteSet`] | set | `HashSet<Value>` |
//! | [`SortedCounter`] | sorted set | member -> score, ordered |
//!
//! Single-command operations go straight to the store. Anything that must
//! read before it writes (pop an arbitrary entry, length-checked index
//! writes, consistent bulk copies) runs on the transaction engine so other
//! clients never observe a half-applied step.
//!
//! Operations mixing two collections classify their operands first
//! ([`OperandClass`]): same backend means the store combines keys natively
//! in one round trip; anything else is fetched, combined locally, and
//! written back.

#![warn(missing_docs)]

pub mod cache;
pub mod counter;
pub mod handle;
pub mod list;
pub mod map;
pub mod operand;
pub mod set;

pub use cache::{CachedMap, WriteBackCache};
pub use counter::{CounterSource, SortedCounter};
pub use handle::Handle;
pub use list::{ListSource, RemoteList};
pub use map::{MapSource, RemoteMap};
pub use operand::OperandClass;
pub use set::{RemoteSet, SetSource};
