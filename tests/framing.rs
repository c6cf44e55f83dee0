//! End-to-end encode/parse behavior through the public API.

use simplehdlc::{
    ByteOrder, Callback, EncodeError, Framer, Handlers, MIN_FRAME_SIZE, ParserState,
    compute_checksum, encode_frame, encode_to_buffer, encoded_size, escaped_size,
};

const ORDERS: [ByteOrder; 2] = [ByteOrder::Little, ByteOrder::Big];

/// Deterministic payload that includes reserved bytes.
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 37 + 0x7D) as u8).collect()
}

fn decode_all(order: ByteOrder, capacity: usize, chunks: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut received = Vec::new();
    let mut on_packet = |p: &[u8]| received.push(p.to_vec());
    let mut rx = vec![0u8; capacity];
    let mut framer = Framer::new(&mut rx, order, Handlers::new().on_packet(&mut on_packet));
    for chunk in chunks {
        framer.parse(chunk);
    }
    assert_eq!(framer.state(), ParserState::AwaitingMarker);
    drop(framer);
    received
}

#[test]
fn test_round_trip_all_lengths() {
    let capacity = 300;
    for order in ORDERS {
        for len in 1..=capacity - 4 {
            let payload = pattern(len);
            let frame = encode_frame(order, &payload).unwrap();
            assert_eq!(frame.len(), encoded_size(&payload));
            assert_eq!(decode_all(order, capacity, &[&frame]), vec![payload]);
        }
    }
}

#[test]
fn test_one_byte_at_a_time_matches_whole() {
    for order in ORDERS {
        let mut stream = Vec::new();
        for len in [1, 2, 126, 127, 200] {
            stream.extend_from_slice(&encode_frame(order, &pattern(len)).unwrap());
        }
        let whole = decode_all(order, 256, &[&stream]);
        let bytes: Vec<&[u8]> = stream.chunks(1).collect();
        assert_eq!(decode_all(order, 256, &bytes), whole);
        assert_eq!(whole.len(), 5);
    }
}

#[test]
fn test_escaped_size_formula() {
    let data = pattern(1000);
    let reserved = data.iter().filter(|&&b| b == 0x7E || b == 0x7D).count();
    assert!(reserved > 0);
    assert_eq!(escaped_size(&data), data.len() + reserved);
}

#[test]
fn test_checksum_reference_vector() {
    assert_eq!(compute_checksum(&[1, 2, 3, 4, 5]), 0x470B_99F4);
}

#[test]
fn test_minimum_frame_size() {
    assert_eq!(MIN_FRAME_SIZE, 7);
    assert_eq!(encoded_size(&[]), MIN_FRAME_SIZE);

    let mut buf = [0u8; 7];
    assert_eq!(encode_to_buffer(ByteOrder::Big, &mut buf, &[]), Ok(7));
    assert!(matches!(
        encode_to_buffer(ByteOrder::Big, &mut buf[..6], &[]),
        Err(EncodeError::BufferTooSmall { .. })
    ));
}

#[test]
fn test_reserved_bytes_double_size() {
    let plain = encoded_size(&[0x01, 0x02]);
    let reserved = encoded_size(&[0x7E, 0x7D]);
    // Both checksums of these payloads are free of reserved bytes
    assert_eq!(plain, 9);
    assert_eq!(reserved, 11);
}

#[test]
fn test_oversize_declared_length_then_valid_frame() {
    for order in ORDERS {
        let mut stream = encode_frame(order, &pattern(64)).unwrap().to_vec();
        stream.extend_from_slice(&encode_frame(order, b"ok").unwrap());
        assert_eq!(decode_all(order, 32, &[&stream]), vec![b"ok".to_vec()]);
    }
}

#[test]
fn test_single_bit_flip_in_payload() {
    for order in ORDERS {
        let payload = b"0123456789";
        let frame = encode_frame(order, payload).unwrap();
        for bit in 0..8 {
            let mut corrupted = frame.to_vec();
            corrupted[5] ^= 1 << bit;
            if corrupted[5] == 0x7E || corrupted[5] == 0x7D {
                continue;
            }
            assert!(decode_all(order, 64, &[&corrupted]).is_empty());
        }
    }
}

#[test]
fn test_sink_and_buffer_agree() {
    let payload = pattern(77);
    for order in ORDERS {
        let mut wire = Vec::new();
        let mut flushed = 0;
        let mut on_byte = |b: u8| wire.push(b);
        let mut on_flush = || flushed += 1;
        let mut rx = [0u8; 8];
        let mut framer = Framer::new(
            &mut rx,
            order,
            Handlers::new().on_byte(&mut on_byte).on_flush(&mut on_flush),
        );
        framer.encode_to_sink(&payload, true).unwrap();
        drop(framer);

        let mut buf = vec![0u8; encoded_size(&payload)];
        let n = encode_to_buffer(order, &mut buf, &payload).unwrap();
        assert_eq!(wire, &buf[..n]);
        assert_eq!(flushed, 1);
    }
}

#[test]
fn test_sink_requires_callbacks() {
    let mut rx = [0u8; 8];
    let mut framer = Framer::new(&mut rx, ByteOrder::Little, Handlers::new());
    assert_eq!(
        framer.encode_to_sink(b"x", false),
        Err(EncodeError::CallbackMissing(Callback::Byte))
    );
}
