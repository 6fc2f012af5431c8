//! Core types for tether
//!
//! This crate defines the leaf-level vocabulary shared by every other crate:
//! - [`Value`]: the canonical value model stored in remote collections
//! - [`Codec`]: the pluggable value <-> bytes boundary
//! - [`Error`] / [`Result`]: the unified error taxonomy
//! - [`Namespace`]: key-identity generation for collection handles

#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod key;
pub mod value;

pub use codec::{Codec, JsonCodec, MsgPackCodec};
pub use error::{Error, Result};
pub use key::{Namespace, MAX_KEY_ATTEMPTS};
pub use value::Value;
