//! Protocol module - wire format, envelopes, and chunk accumulation.
//!
//! This module implements the response framing of the deals service:
//! - Size-table header parsing with a bounded header search
//! - Envelope with zero-copy segment slicing (and the matching encoder)
//! - Envelope buffer for bodies that arrive in chunks

mod envelope;
mod envelope_buffer;
mod wire_format;

pub use envelope::{encode_envelope, Envelope};
pub use envelope_buffer::{EnvelopeBuffer, DEFAULT_MAX_ENVELOPE_SIZE};
pub use wire_format::{
    parse_info_length, SizeTable, DELIMITER, HEADER_SEARCH_WINDOW, MIN_INFO_LENGTH,
};
