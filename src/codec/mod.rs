//! Codec module - turning segment bytes into record values.
//!
//! This module provides the two segment encodings the deals service uses:
//!
//! - [`SegmentCodec::Raw`] - segment bytes are record JSON as-is
//! - [`SegmentCodec::Deflate`] - segment bytes are a zlib stream that
//!   inflates to record JSON
//!
//! # Design
//!
//! The codec is chosen by the caller (the load generator decodes raw
//! bodies, the decode tool decodes compressed ones) and never sniffed from
//! content. [`JsonCodec`] and [`InflateCodec`] are marker structs with
//! static methods, like the building blocks they wrap.
//!
//! # Example
//!
//! ```
//! use deals_bench::codec::{InflateCodec, SegmentCodec};
//!
//! let text = br#"{"origin":"MOW","price":7133}"#;
//! let value = SegmentCodec::Raw.decode(0, text).unwrap();
//! assert_eq!(value["origin"], "MOW");
//!
//! let packed = InflateCodec::deflate(text).unwrap();
//! let value = SegmentCodec::Deflate.decode(0, &packed).unwrap();
//! assert_eq!(value["price"], 7133);
//! ```

mod inflate;
mod json;

pub use inflate::{InflateCodec, MAX_INFLATED_SIZE};
pub use json::JsonCodec;

use serde_json::Value;

use crate::error::{DealsError, Result};

/// How the bytes of one segment are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentCodec {
    /// Plain record JSON.
    Raw,
    /// zlib-compressed record JSON.
    Deflate,
}

impl SegmentCodec {
    /// Decode one segment into a JSON value.
    ///
    /// Any failure is reported as `SegmentDecode` carrying `index` and enough
    /// of the segment to diagnose it.
    pub fn decode(self, index: usize, bytes: &[u8]) -> Result<Value> {
        match self {
            SegmentCodec::Raw => JsonCodec::decode_value(bytes).map_err(|e| {
                DealsError::segment(index, format!("{e}; text: {}", preview(bytes)))
            }),
            SegmentCodec::Deflate => {
                let text = InflateCodec::inflate(bytes).map_err(|e| {
                    let reason = format!("inflate failed ({} bytes): {e}", bytes.len());
                    DealsError::segment(index, reason)
                })?;
                JsonCodec::decode_value(&text).map_err(|e| {
                    DealsError::segment(index, format!("{e}; text: {}", preview(&text)))
                })
            }
        }
    }

    /// Encode record JSON into segment bytes.
    pub fn encode(self, json: &[u8]) -> Result<Vec<u8>> {
        match self {
            SegmentCodec::Raw => Ok(json.to_vec()),
            SegmentCodec::Deflate => InflateCodec::deflate(json),
        }
    }
}

/// Maximum characters of segment text echoed into a diagnostic.
const PREVIEW_LIMIT: usize = 256;

/// Lossy, length-capped view of segment text for diagnostics.
fn preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() <= PREVIEW_LIMIT {
        return format!("{text:?}");
    }
    let head: String = text.chars().take(PREVIEW_LIMIT).collect();
    format!("{head:?}... ({} bytes)", bytes.len())
}
