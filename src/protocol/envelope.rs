//! Response envelope with zero-copy segment access.
//!
//! An [`Envelope`] owns one complete response body. Parsing validates the
//! size table and every segment range up front, so [`Envelope::segments`]
//! can hand out cheap `Bytes` slices without further checks.
//!
//! # Example
//!
//! ```
//! use deals_bench::protocol::{encode_envelope, Envelope};
//!
//! let body = encode_envelope(&[&b"{}"[..], &b"[1]"[..]]);
//! assert_eq!(&body[..], b"6;2;3;{}[1]");
//!
//! let envelope = Envelope::parse(body).unwrap();
//! assert_eq!(envelope.segment_count(), 2);
//! assert_eq!(&envelope.segments()[1][..], b"[1]");
//! ```

use std::ops::Range;

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{SizeTable, DELIMITER};
use crate::error::Result;

/// A parsed response body.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Raw body bytes.
    body: Bytes,
    /// Parsed size table.
    table: SizeTable,
    /// Validated segment ranges into `body`.
    ranges: Vec<Range<usize>>,
}

impl Envelope {
    /// Parse and validate an envelope.
    ///
    /// # Errors
    ///
    /// `MalformedHeader` or `MalformedSizeTable`; either is fatal to this
    /// envelope only.
    pub fn parse(body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        let table = SizeTable::parse(&body)?;
        let ranges = table.ranges(body.len())?;
        Ok(Self {
            body,
            table,
            ranges,
        })
    }

    /// Segment Extractor: slice every segment out of the body, in order.
    ///
    /// Slices share the body allocation.
    pub fn segments(&self) -> Vec<Bytes> {
        self.ranges
            .iter()
            .map(|range| self.body.slice(range.clone()))
            .collect()
    }

    /// Borrow a single segment.
    pub fn segment(&self, index: usize) -> Option<&[u8]> {
        self.ranges.get(index).map(|range| &self.body[range.clone()])
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.ranges.len()
    }

    /// The parsed size table.
    #[inline]
    pub fn table(&self) -> &SizeTable {
        &self.table
    }

    /// Whole body length.
    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check whether the body is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Build a response body the way the deals service does.
///
/// The leading integer is the length of the whole size table, including its
/// own digits and delimiter, and doubles as the data pointer.
pub fn encode_envelope<S: AsRef<[u8]>>(segments: &[S]) -> Bytes {
    let mut sizes = String::new();
    for segment in segments {
        sizes.push_str(&segment.as_ref().len().to_string());
        sizes.push(char::from(DELIMITER));
    }

    let info_length = info_length_for(sizes.len());
    let data_len: usize = segments.iter().map(|s| s.as_ref().len()).sum();

    let mut buf = BytesMut::with_capacity(info_length + data_len);
    buf.put_slice(info_length.to_string().as_bytes());
    buf.put_u8(DELIMITER);
    buf.put_slice(sizes.as_bytes());
    for segment in segments {
        buf.put_slice(segment.as_ref());
    }

    debug_assert_eq!(buf.len(), info_length + data_len);
    buf.freeze()
}

/// Smallest `L` with `L == sizes_len + digits(L) + 1`.
fn info_length_for(sizes_len: usize) -> usize {
    let mut digits = 1;
    loop {
        let candidate = sizes_len + digits + 1;
        let needed = candidate.to_string().len();
        if needed == digits {
            return candidate;
        }
        digits = needed;
    }
}
