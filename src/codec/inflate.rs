//! zlib inflate/deflate using `flate2`.
//!
//! The production path of the deals service stores each record as a
//! zlib-wrapped DEFLATE stream. Inflated output is capped so that a corrupt
//! or hostile segment cannot balloon memory.

use std::io::{Error as IoError, ErrorKind, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::Result;

/// Upper bound on the inflated size of a single segment (16 MiB).
pub const MAX_INFLATED_SIZE: usize = 16 * 1024 * 1024;

/// Output growth step while inflating.
const INFLATE_CHUNK: usize = 4 * 1024;

/// Codec for zlib-compressed segments.
pub struct InflateCodec;

impl InflateCodec {
    /// Inflate a zlib stream.
    ///
    /// # Errors
    ///
    /// Returns an I/O error for corrupt or truncated input, or for output
    /// larger than [`MAX_INFLATED_SIZE`].
    pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
        Self::inflate_with_limit(data, MAX_INFLATED_SIZE)
    }

    /// Inflate with a custom output limit.
    ///
    /// The stream must reach its end marker; input that runs out first is
    /// reported as truncated rather than returning partial output.
    pub fn inflate_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>> {
        let mut decompress = Decompress::new(true);
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).max(INFLATE_CHUNK));

        loop {
            if out.len() > limit {
                return Err(invalid(format!("inflated segment exceeds {} bytes", limit)));
            }
            if out.len() == out.capacity() {
                out.reserve(INFLATE_CHUNK);
            }

            let (in_before, out_before) = (decompress.total_in(), decompress.total_out());
            let status = decompress
                .decompress_vec(&data[in_before as usize..], &mut out, FlushDecompress::Finish)
                .map_err(|e| invalid(e.to_string()))?;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let stalled = decompress.total_in() == in_before
                        && decompress.total_out() == out_before;
                    if stalled {
                        return Err(invalid("truncated zlib stream".to_string()));
                    }
                }
            }
        }

        if out.len() > limit {
            return Err(invalid(format!("inflated segment exceeds {} bytes", limit)));
        }
        Ok(out)
    }

    /// Deflate into a zlib stream.
    pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            ZlibEncoder::new(Vec::with_capacity(data.len()), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }
}

fn invalid(message: String) -> crate::error::DealsError {
    IoError::new(ErrorKind::InvalidData, message).into()
}
