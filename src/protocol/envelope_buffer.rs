//! Buffer for accumulating a response body delivered in chunks.
//!
//! Uses `bytes::BytesMut` so the finished body is handed to [`Envelope`]
//! without another copy. The body of a deals response carries no outer
//! length, so the buffer simply grows until the producer signals the end
//! (EOF on stdin, end of an HTTP body) and is then frozen.
//!
//! # Example
//!
//! ```
//! use deals_bench::protocol::EnvelopeBuffer;
//!
//! let mut buffer = EnvelopeBuffer::new();
//! buffer.push(b"6;3;2;ab").unwrap();
//! buffer.push(b"cde").unwrap();
//!
//! let envelope = buffer.finish().unwrap();
//! assert_eq!(envelope.segment(1), Some(&b"de"[..]));
//! ```

use bytes::{Bytes, BytesMut};

use super::Envelope;
use crate::error::{DealsError, Result};

/// Default maximum accumulated body size (64 MiB).
pub const DEFAULT_MAX_ENVELOPE_SIZE: usize = 64 * 1024 * 1024;

/// Initial buffer capacity.
const INITIAL_CAPACITY: usize = 64 * 1024;

/// Accumulates chunks of one response body.
pub struct EnvelopeBuffer {
    /// Accumulated bytes.
    buffer: BytesMut,
    /// Maximum allowed body size.
    max_size: usize,
    /// Number of chunks pushed so far.
    chunks: usize,
}

impl EnvelopeBuffer {
    /// Create a new buffer with default settings.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_ENVELOPE_SIZE)
    }

    /// Create a new buffer with a custom size limit.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY.min(max_size)),
            max_size,
            chunks: 0,
        }
    }

    /// Append one chunk.
    ///
    /// # Errors
    ///
    /// `EnvelopeTooLarge` if the chunk would push the body past the limit.
    /// The buffer is left unchanged in that case.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        let size = self.buffer.len() + chunk.len();
        if size > self.max_size {
            return Err(DealsError::EnvelopeTooLarge {
                size,
                max: self.max_size,
            });
        }
        self.buffer.extend_from_slice(chunk);
        self.chunks += 1;
        Ok(())
    }

    /// Freeze the accumulated bytes and parse them as an envelope.
    pub fn finish(self) -> Result<Envelope> {
        Envelope::parse(self.into_bytes())
    }

    /// Freeze the accumulated bytes without parsing.
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of chunks received.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.chunks = 0;
    }
}

impl Default for EnvelopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}
