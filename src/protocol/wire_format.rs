//! Wire format parsing.
//!
//! Every response body of the deals service starts with a size table:
//! ```text
//! <-    size table    -><-      data blocks       ->
//! 43;120;120;...;121;   {....}{....}{....}{....}
//! ↑   ↑   ↑       ↑
//! │   └───┴───────┴─ byte length of each data block
//! └─ info_length: byte length of the whole table, delimiter included
//! ```
//!
//! The header integer doubles as the first table entry, the data pointer.
//! All integers are unsigned ASCII decimal separated by `;`.

use crate::error::{DealsError, Result};

/// Field delimiter of the size table.
pub const DELIMITER: u8 = b';';

/// Number of leading bytes scanned for the header delimiter.
pub const HEADER_SEARCH_WINDOW: usize = 100;

/// Smallest possible table: one digit plus the delimiter.
pub const MIN_INFO_LENGTH: usize = 2;

/// Parsed size table of one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTable {
    /// Byte length of the table region, delimiter included.
    pub info_length: usize,
    /// Offset of the first data block.
    pub data_pointer: usize,
    /// Byte length of each data block, in order.
    pub segment_lengths: Vec<usize>,
}

impl SizeTable {
    /// Parse the size table from the start of an envelope.
    ///
    /// # Errors
    ///
    /// `MalformedHeader` if the header is missing or not numeric,
    /// `MalformedSizeTable` if any entry is bad or the table boundary is off.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let info_length = parse_info_length(buf)?;
        let (data_pointer, segment_lengths) = parse_entries(buf, info_length)?;
        Ok(Self {
            info_length,
            data_pointer,
            segment_lengths,
        })
    }

    /// Number of data blocks described by the table.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_lengths.len()
    }

    /// Total bytes claimed by the data blocks.
    pub fn data_len(&self) -> usize {
        self.segment_lengths.iter().sum()
    }

    /// Byte ranges of each data block, validated against `buf_len`.
    ///
    /// Ranges are consecutive and non-overlapping, starting at the data
    /// pointer. Trailing bytes after the last block are tolerated.
    pub fn ranges(&self, buf_len: usize) -> Result<Vec<std::ops::Range<usize>>> {
        if self.data_pointer < self.info_length {
            return Err(DealsError::size_table(
                0,
                format!(
                    "data pointer {} points inside the size table ({} bytes)",
                    self.data_pointer, self.info_length
                ),
            ));
        }

        let mut pointer = self.data_pointer;
        let mut ranges = Vec::with_capacity(self.segment_lengths.len());

        for (i, &len) in self.segment_lengths.iter().enumerate() {
            let end = pointer
                .checked_add(len)
                .filter(|&end| end <= buf_len)
                .ok_or_else(|| {
                    DealsError::size_table(
                        i + 1,
                        format!(
                            "segment [{}, {}+{}) runs past envelope end {}",
                            pointer, pointer, len, buf_len
                        ),
                    )
                })?;
            ranges.push(pointer..end);
            pointer = end;
        }

        Ok(ranges)
    }
}

/// Frame Header Parser: find the first delimiter within the search window
/// and parse the bytes before it as `info_length`.
pub fn parse_info_length(buf: &[u8]) -> Result<usize> {
    let window = &buf[..buf.len().min(HEADER_SEARCH_WINDOW)];

    let pos = window
        .iter()
        .position(|&b| b == DELIMITER)
        .ok_or_else(|| {
            DealsError::MalformedHeader(format!("no delimiter in first {} bytes", window.len()))
        })?;

    parse_decimal(&buf[..pos]).ok_or_else(|| {
        DealsError::MalformedHeader(format!(
            "header {:?} is not a decimal integer",
            String::from_utf8_lossy(&buf[..pos])
        ))
    })
}

/// Parse table entries from `[0, info_length - 1)`.
///
/// Returns the data pointer and the segment lengths.
fn parse_entries(buf: &[u8], info_length: usize) -> Result<(usize, Vec<usize>)> {
    if info_length < MIN_INFO_LENGTH || info_length > buf.len() {
        return Err(DealsError::size_table(
            0,
            format!(
                "info length {} outside [{}, {}]",
                info_length,
                MIN_INFO_LENGTH,
                buf.len()
            ),
        ));
    }

    // The table must end exactly on a delimiter; an off-by-one header lands
    // inside a number or inside the data region.
    if buf[info_length - 1] != DELIMITER {
        return Err(DealsError::size_table(
            0,
            format!("byte {} is not the table terminator", info_length - 1),
        ));
    }

    let mut entries = buf[..info_length - 1].split(|&b| b == DELIMITER);

    // split() always yields at least one item.
    let pointer_raw = entries.next().unwrap_or_default();
    let data_pointer = parse_decimal(pointer_raw)
        .ok_or_else(|| DealsError::size_table(0, describe(pointer_raw)))?;

    let segment_lengths = entries
        .enumerate()
        .map(|(i, raw)| {
            parse_decimal(raw).ok_or_else(|| DealsError::size_table(i + 1, describe(raw)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((data_pointer, segment_lengths))
}

fn describe(raw: &[u8]) -> String {
    format!("{:?} is not a decimal integer", String::from_utf8_lossy(raw))
}

/// Strict unsigned ASCII decimal. Empty input, signs and whitespace are rejected.
pub(crate) fn parse_decimal(raw: &[u8]) -> Option<usize> {
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
        return None;
    }
    raw.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
    })
}
