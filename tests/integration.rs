//! Integration tests for deals-bench.
//!
//! These tests run service-shaped bodies through the whole decode path.

use bytes::Bytes;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use deals_bench::bench::{random_city_pair, CITIES};
use deals_bench::codec::{InflateCodec, JsonCodec, SegmentCodec};
use deals_bench::decoder::{decode_compressed, decode_envelope, decode_raw, filter_records};
use deals_bench::protocol::{encode_envelope, Envelope, EnvelopeBuffer};
use deals_bench::record::{DateCreated, DealRecord, Trip};
use deals_bench::DealsError;

/// Ten deals from MOW exactly as the service returned them.
const TOP_MOW: &[u8] = include_bytes!("fixtures/top_mow.txt");

const TOP_MOW_DESTINATIONS: [&str; 10] = [
    "MAD", "LON", "JFK", "PAR", "AER", "FRA", "LAX", "OVB", "BAR", "BER",
];

const TOP_MOW_PRICES: [i64; 10] = [7133, 8389, 8659, 9739, 7205, 11042, 8334, 7001, 6871, 10290];

fn with_header(header: &str) -> Vec<u8> {
    let mut body = header.as_bytes().to_vec();
    body.extend_from_slice(&TOP_MOW[3..]);
    body
}

/// Test the literal service response decodes to its ten records in order.
#[test]
fn test_golden_top_response() {
    assert!(TOP_MOW.starts_with(b"43;120;120;120;120;120;121;121;121;120;121;{"));

    let envelope = Envelope::parse(Bytes::from_static(TOP_MOW)).unwrap();
    assert_eq!(envelope.table().info_length, 43);
    assert_eq!(envelope.table().data_pointer, 43);
    assert_eq!(envelope.segment_count(), 10);

    let records = filter_records(decode_raw(&envelope));
    assert_eq!(records.len(), 10);

    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.origin, "MOW");
        assert_eq!(record.destination, TOP_MOW_DESTINATIONS[i]);
        assert_eq!(record.price, TOP_MOW_PRICES[i]);
    }

    assert_eq!(records[0].departure_date, "2016-08-23");
    assert_eq!(records[0].return_date, "2016-03-19");
    assert!(records[0].direct);
    assert!(!records[6].direct);
}

/// Test every segment re-serializes to exactly the bytes it came from.
#[test]
fn test_golden_segments_are_byte_exact() {
    let envelope = Envelope::parse(Bytes::from_static(TOP_MOW)).unwrap();
    let records = filter_records(decode_raw(&envelope));

    for (segment, record) in envelope.segments().iter().zip(&records) {
        assert_eq!(JsonCodec::encode(record).unwrap(), segment.to_vec());
    }
}

/// Test the fixture survives arbitrary chunking through the envelope buffer.
#[test]
fn test_golden_response_in_chunks() {
    for chunk_size in [1, 7, 43, 44, 500, TOP_MOW.len()] {
        let mut buffer = EnvelopeBuffer::new();
        for chunk in TOP_MOW.chunks(chunk_size) {
            buffer.push(chunk).unwrap();
        }
        let envelope = buffer.finish().unwrap();
        assert_eq!(filter_records(decode_raw(&envelope)).len(), 10, "{chunk_size}");
    }
}

/// Test a header one byte short or long is detected, not misread.
#[test]
fn test_off_by_one_header_detected() {
    for header in ["42;", "44;"] {
        let err = Envelope::parse(with_header(header)).unwrap_err();
        assert!(
            matches!(err, DealsError::MalformedSizeTable { entry: 0, .. }),
            "{header}: {err}"
        );
    }

    // Same bytes with the right header still decode.
    let envelope = Envelope::parse(with_header("43;")).unwrap();
    assert_eq!(envelope.segment_count(), 10);
}

/// Test a garbage body is a malformed header.
#[test]
fn test_garbage_body_rejected() {
    let body = vec![b'x'; 4096];
    let err = Envelope::parse(body).unwrap_err();
    assert!(matches!(err, DealsError::MalformedHeader(_)));
}

/// Test one corrupt raw segment costs exactly one record.
#[test]
fn test_raw_partial_failure_isolation() {
    for k in 0..10 {
        let mut body = TOP_MOW.to_vec();
        let start = 43 + (0..k).map(|i| if [5, 6, 7, 9].contains(&i) { 121 } else { 120 }).sum::<usize>();
        // Break the opening brace of segment k.
        assert_eq!(body[start], b'{');
        body[start] = b'<';

        let envelope = Envelope::parse(body).unwrap();
        let records = filter_records(decode_raw(&envelope));

        assert_eq!(records.len(), 9, "segment {k}");
        let destinations: Vec<_> = records.iter().map(|r| r.destination.as_str()).collect();
        let expected: Vec<_> = TOP_MOW_DESTINATIONS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != k)
            .map(|(_, d)| *d)
            .collect();
        assert_eq!(destinations, expected);
    }
}

fn compressed_fixture() -> (Vec<DealRecord>, Vec<Vec<u8>>) {
    let envelope = Envelope::parse(Bytes::from_static(TOP_MOW)).unwrap();
    let records = filter_records(decode_raw(&envelope));
    let packed = envelope
        .segments()
        .iter()
        .map(|segment| InflateCodec::deflate(segment).unwrap())
        .collect();
    (records, packed)
}

/// Test the compressed path yields the same records as the raw path.
#[tokio::test]
async fn test_compressed_fixture_matches_raw() {
    let (expected, packed) = compressed_fixture();
    let body = encode_envelope(&packed);

    let records = decode_envelope(body, SegmentCodec::Deflate).await.unwrap();
    assert_eq!(records, expected);
}

/// Test truncated and garbage compressed segments cost one record each.
#[tokio::test]
async fn test_compressed_partial_failure_isolation() {
    let (expected, mut packed) = compressed_fixture();
    let half = packed[2].len() / 2;
    packed[2].truncate(half);
    packed[7] = b"not zlib at all".to_vec();

    let envelope = Envelope::parse(encode_envelope(&packed)).unwrap();
    let results = decode_compressed(&envelope).await;

    assert_eq!(results.len(), 10);
    assert!(matches!(results[2], Err(DealsError::SegmentDecode { index: 2, .. })));
    assert!(matches!(results[7], Err(DealsError::SegmentDecode { index: 7, .. })));

    let records = filter_records(results);
    let expected: Vec<_> = expected
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != 2 && *i != 7)
        .map(|(_, r)| r)
        .collect();
    assert_eq!(records, expected);
}

/// Test the decode tool's output for extended records.
#[tokio::test]
async fn test_extended_records_render() {
    let record = DealRecord {
        origin: "MOW".into(),
        destination: "BER".into(),
        destination_country: Some("DE".into()),
        price: 10290,
        trips: Some(vec![
            Trip {
                from: "MOW".into(),
                to: "BER".into(),
                start_date: "2016-03-09".into(),
                continued: false,
            },
            Trip {
                from: "BER".into(),
                to: "MOW".into(),
                start_date: "2016-06-20".into(),
                continued: false,
            },
        ]),
        date_created: Some(DateCreated::Text("2016-02-29T08:15:00.000Z".into())),
        ..Default::default()
    };

    let packed = InflateCodec::deflate(&JsonCodec::encode(&record).unwrap()).unwrap();
    let body = encode_envelope(&[packed]);
    let records = decode_envelope(body, SegmentCodec::Deflate).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].render_line(),
        "MOW-BER:DE 10290 MOWBER(2016-03-09)===BERMOW(2016-06-20) 2016-02-29T08:15:00"
    );
}

fn record_strategy() -> impl Strategy<Value = DealRecord> {
    (
        0..CITIES.len(),
        0..CITIES.len(),
        "2016-(0[1-9]|1[01])-(0[1-9]|1[0-9]|2[0-7])",
        "2016-(0[1-9]|1[01])-(0[1-9]|1[0-9]|2[0-7])",
        any::<bool>(),
        5000i64..35000,
    )
        .prop_map(|(o, d, departure, ret, direct, price)| DealRecord {
            origin: CITIES[o].to_string(),
            departure_date: departure,
            destination: CITIES[d].to_string(),
            return_date: ret,
            direct,
            price,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn prop_raw_round_trip(records in prop::collection::vec(record_strategy(), 0..40)) {
        let segments: Vec<Vec<u8>> = records
            .iter()
            .map(|r| JsonCodec::encode(r).unwrap())
            .collect();

        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();
        prop_assert_eq!(envelope.table().data_pointer, envelope.table().info_length);

        let decoded = filter_records(decode_raw(&envelope));
        prop_assert_eq!(decoded, records);
    }

    #[test]
    fn prop_arbitrary_segments_round_trip(
        segments in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..200)
    ) {
        let envelope = Envelope::parse(encode_envelope(&segments)).unwrap();
        let sliced: Vec<Vec<u8>> = envelope.segments().iter().map(|s| s.to_vec()).collect();
        prop_assert_eq!(sliced, segments);
    }

    #[test]
    fn prop_city_pair_never_repeats(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..100 {
            let (origin, destination) = random_city_pair(&mut rng);
            prop_assert_ne!(origin, destination);
        }
    }
}
