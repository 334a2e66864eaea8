//! Payload decoding and record filtering.
//!
//! Turns a parsed [`Envelope`] into deal records in two steps:
//!
//! 1. **Decode** every segment with the caller's [`SegmentCodec`], giving
//!    one `Result` per segment. The raw path runs inline; the compressed
//!    path inflates segments on the blocking pool and collects them in
//!    segment order.
//! 2. **Filter** the per-segment results down to JSON objects and convert
//!    those into [`DealRecord`]s.
//!
//! A failed segment is logged and dropped; it never aborts the batch.
//!
//! # Example
//!
//! ```
//! use deals_bench::decoder::{decode_raw, filter_records};
//! use deals_bench::protocol::{encode_envelope, Envelope};
//!
//! let body = encode_envelope(&[
//!     &br#"{"origin":"MOW","destination":"LED","price":5100}"#[..],
//!     &b"{broken"[..],
//! ]);
//! let envelope = Envelope::parse(body).unwrap();
//!
//! let results = decode_raw(&envelope);
//! assert_eq!(results.len(), 2);
//! assert!(results[1].is_err());
//!
//! let records = filter_records(results);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].destination, "LED");
//! ```

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::codec::SegmentCodec;
use crate::error::{DealsError, Result};
use crate::protocol::Envelope;
use crate::record::DealRecord;

/// Decode result for one segment.
pub type SegmentResult = Result<Value>;

/// Decode every segment as plain record JSON, in order.
pub fn decode_raw(envelope: &Envelope) -> Vec<SegmentResult> {
    (0..envelope.segment_count())
        .map(|index| {
            let bytes = envelope.segment(index).unwrap_or_default();
            SegmentCodec::Raw.decode(index, bytes)
        })
        .collect()
}

/// Inflate and decode every segment.
///
/// Each segment is inflated on tokio's blocking pool so segments proceed
/// concurrently; results are collected in segment order regardless of
/// completion order.
pub async fn decode_compressed(envelope: &Envelope) -> Vec<SegmentResult> {
    let handles: Vec<_> = envelope
        .segments()
        .into_iter()
        .enumerate()
        .map(|(index, bytes)| {
            tokio::task::spawn_blocking(move || SegmentCodec::Deflate.decode(index, &bytes))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(DealsError::segment(index, format!("inflate task failed: {e}"))),
        };
        results.push(result);
    }
    results
}

/// Decode every segment with the given codec.
pub async fn decode_segments(envelope: &Envelope, codec: SegmentCodec) -> Vec<SegmentResult> {
    match codec {
        SegmentCodec::Raw => decode_raw(envelope),
        SegmentCodec::Deflate => decode_compressed(envelope).await,
    }
}

/// Keep the results that are JSON objects, in order.
///
/// Failed segments and non-object values are logged and dropped.
pub fn filter_objects(results: Vec<SegmentResult>) -> Vec<Map<String, Value>> {
    results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            Ok(Value::Object(object)) => Some(object),
            Ok(other) => {
                tracing::warn!("Segment {} is not an object: {}", index, kind_of(&other));
                None
            }
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        })
        .collect()
}

/// Record Filter: every object becomes a deal record.
///
/// Field conversion is lenient, so only failed segments and non-object
/// values are dropped.
pub fn filter_records(results: Vec<SegmentResult>) -> Vec<DealRecord> {
    filter_objects(results)
        .into_iter()
        .filter_map(|object| match DealRecord::from_object(object) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping object that is not a deal record: {}", e);
                None
            }
        })
        .collect()
}

/// Parse, decode and filter one response body.
///
/// # Errors
///
/// Only a malformed header or size table fails the call; segment failures
/// just shrink the output.
pub async fn decode_envelope(body: Bytes, codec: SegmentCodec) -> Result<Vec<DealRecord>> {
    let envelope = Envelope::parse(body).map_err(|e| {
        tracing::error!("Malformed envelope: {}", e);
        e
    })?;

    tracing::debug!(
        "Decoding {} segments ({} bytes) as {:?}",
        envelope.segment_count(),
        envelope.len(),
        codec
    );

    let results = decode_segments(&envelope, codec).await;
    Ok(filter_records(results))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::InflateCodec;
    use crate::protocol::encode_envelope;

    fn record_json(origin: &str, destination: &str, price: i64) -> Vec<u8> {
        format!(
            r#"{{"origin":"{origin}","departure_date":"2016-01-02","destination":"{destination}","return_date":"2016-02-03","direct":false,"price":{price}}}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_raw_decode_in_order() {
        let segments = [
            record_json("MOW", "MAD", 7133),
            record_json("MOW", "LON", 8389),
            record_json("MOW", "JFK", 8659),
        ];
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();

        let records = filter_records(decode_raw(&envelope));
        let destinations: Vec<_> = records.iter().map(|r| r.destination.as_str()).collect();
        assert_eq!(destinations, ["MAD", "LON", "JFK"]);
        assert_eq!(records[2].price, 8659);
    }

    #[test]
    fn test_raw_failure_keeps_position() {
        let segments = [
            record_json("MOW", "MAD", 1),
            b"{\"origin\":".to_vec(),
            record_json("MOW", "PAR", 3),
        ];
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();

        let results = decode_raw(&envelope);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DealsError::SegmentDecode { index: 1, .. })
        ));
        assert!(results[2].is_ok());

        let records = filter_records(results);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].destination, "PAR");
    }

    #[test]
    fn test_zero_length_segment_is_a_dropped_failure() {
        let segments = [Vec::new(), record_json("MOW", "AER", 7205)];
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();

        let results = decode_raw(&envelope);
        assert!(results[0].is_err());
        assert_eq!(filter_records(results).len(), 1);
    }

    #[test]
    fn test_filter_drops_non_objects() {
        let results = vec![
            Ok(Value::Null),
            Ok(serde_json::json!([1, 2])),
            Ok(serde_json::json!({"origin": "BER"})),
            Ok(serde_json::json!("text")),
        ];
        let objects = filter_objects(results);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["origin"], "BER");
    }

    #[test]
    fn test_filter_keeps_objects_with_odd_field_types() {
        let values = vec![
            serde_json::json!({"origin": "MOW", "destination": "MAD", "price": 7133.0}),
            serde_json::json!({"origin": "BER", "price": "cheap", "direct": null}),
            serde_json::json!({"origin": "FRA", "price": 11042, "trips": null}),
        ];
        let objects = filter_objects(values.iter().cloned().map(Ok).collect());
        let records = filter_records(values.into_iter().map(Ok).collect());

        assert_eq!(objects.len(), 3);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].price, 7133);
        assert_eq!(records[1].origin, "BER");
        assert_eq!(records[1].price, 0);
        assert!(!records[1].direct);
        assert!(records[2].trips.is_none());
    }

    #[tokio::test]
    async fn test_compressed_decode_in_order() {
        let segments: Vec<Vec<u8>> = ["MAD", "LON", "JFK", "PAR", "AER"]
            .iter()
            .enumerate()
            .map(|(i, dest)| InflateCodec::deflate(&record_json("MOW", dest, i as i64)).unwrap())
            .collect();
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();

        let records = filter_records(decode_compressed(&envelope).await);
        let prices: Vec<_> = records.iter().map(|r| r.price).collect();
        assert_eq!(prices, [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_compressed_failure_is_isolated() {
        let good = InflateCodec::deflate(&record_json("MOW", "OVB", 7001)).unwrap();
        let truncated = good[..good.len() / 2].to_vec();
        let segments = [good.clone(), truncated, good];
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();

        let results = decode_compressed(&envelope).await;
        assert!(matches!(
            results[1],
            Err(DealsError::SegmentDecode { index: 1, .. })
        ));
        assert_eq!(filter_records(results).len(), 2);
    }

    #[tokio::test]
    async fn test_decode_envelope_rejects_malformed_body() {
        let err = decode_envelope(Bytes::from_static(b"no header here"), SegmentCodec::Raw)
            .await
            .unwrap_err();
        assert!(matches!(err, DealsError::MalformedHeader(_)));
    }

    #[tokio::test]
    async fn test_decode_envelope_raw() {
        let body = encode_envelope(&[record_json("MOW", "LAX", 8334)]);
        let records = decode_envelope(body, SegmentCodec::Raw).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].destination, "LAX");
    }
}
