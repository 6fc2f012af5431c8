//! Convenience re-exports for the common path
//!
//! ```
//! use tetherdb::prelude::*;
//! ```

pub use crate::client::{Tether, TetherBuilder};
pub use tether_collections::{
    CachedMap, CounterSource, ListSource, MapSource, RemoteList, RemoteMap, RemoteSet, SetSource,
    SortedCounter,
};
pub use tether_core::{Error, Result, Value};
pub use tether_txn::RetryPolicy;
