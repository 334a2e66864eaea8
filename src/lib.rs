//! # deals-bench
//!
//! Load generator and response decoder for the deals aggregation service.
//!
//! ## Architecture
//!
//! - **Protocol**: size-table framed response bodies, parsed into
//!   [`Envelope`]s with zero-copy segment access
//! - **Codec / Decoder**: per-segment JSON, optionally zlib-compressed,
//!   decoded into [`DealRecord`]s without letting one bad segment sink the
//!   batch
//! - **Bench**: write and read phases driven over a [`Transport`]
//!
//! ## Example
//!
//! ```
//! use deals_bench::codec::SegmentCodec;
//! use deals_bench::decoder::decode_envelope;
//! use deals_bench::protocol::encode_envelope;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let body = encode_envelope(&[&br#"{"origin":"MOW","destination":"BER","price":10290}"#[..]]);
//! let records = decode_envelope(body, SegmentCodec::Raw).await.unwrap();
//! assert_eq!(records[0].price, 10290);
//! # });
//! ```

pub mod bench;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod record;
pub mod transport;

pub use bench::{BenchConfig, Session};
pub use error::{DealsError, Result};
pub use protocol::{encode_envelope, Envelope};
pub use record::DealRecord;
pub use transport::{HttpTransport, Transport};
