//! JSON codec using `serde_json`.
//!
//! Deal records travel as compact JSON objects, one per segment. Decoding
//! goes through `serde_json::Value` first so that "is this an object at
//! all" is answered separately from "does it have the expected fields".
//!
//! # Example
//!
//! ```
//! use deals_bench::codec::JsonCodec;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     id: u32,
//!     content: String,
//! }
//!
//! let msg = Message { id: 42, content: "hello".to_string() };
//! let encoded = JsonCodec::encode(&msg).unwrap();
//! assert_eq!(encoded, br#"{"id":42,"content":"hello"}"#);
//!
//! let decoded: Message = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use serde_json::Value;

use crate::error::Result;

/// JSON codec for record text.
///
/// Uses the compact writer, so field order follows struct declaration order
/// and no whitespace is emitted.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Encode a value to a compact JSON string.
    #[inline]
    pub fn encode_string<T: serde::Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Decode JSON bytes to a typed value.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode JSON bytes to an untyped value.
    #[inline]
    pub fn decode_value(bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
