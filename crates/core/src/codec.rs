//! The value <-> bytes boundary
//!
//! Every key and value persisted remotely passes through a [`Codec`]. The
//! store itself only ever sees opaque byte strings.
//!
//! ## Determinism
//!
//! Hash fields and set members are addressed by their encoded bytes, so a
//! codec must encode equal values to identical bytes within one process.
//! Both bundled codecs satisfy this because [`Value::Object`] keeps its
//! entries ordered.

use crate::error::{Error, Result};
use crate::value::Value;

/// Serialize and deserialize values to and from opaque byte strings.
///
/// Implementations must round-trip: `decode(encode(v)) == v` for every value
/// they accept.
pub trait Codec: Send + Sync {
    /// Encode a value to bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// MessagePack codec (the default).
///
/// Compact, binary-safe, and handles every [`Value`] including NaN and
/// infinite floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        rmp_serde::to_vec(value).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }
}

/// JSON codec, for stores inspected by other tooling.
///
/// Rejects NaN and infinite floats (JSON has no representation for them).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }
}
