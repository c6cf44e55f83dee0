//! Frame encoding.
//!
//! The wire format is:
//! ```text
//! ┌──────────┬──────────────┬─────────────────┬──────────────┐
//! │  0x7e    │  length      │    payload      │   CRC-32     │
//! │  1 byte  │   2 bytes    │  length bytes   │   4 bytes    │
//! └──────────┴──────────────┴─────────────────┴──────────────┘
//! ```
//!
//! Everything after the marker is byte-stuffed, so the escaped length,
//! payload and checksum may each be longer on the wire. The length and
//! checksum fields follow the configured [`ByteOrder`].

use bytes::{Bytes, BytesMut};

use super::checksum::{CHECKSUM_SIZE, compute_checksum};
use super::order::ByteOrder;
use super::stuffing::{BOUNDARY_MARKER, escape_byte, escaped_size};
use crate::error::EncodeError;

/// Size of the length field in bytes, before escaping.
pub const LENGTH_SIZE: usize = 2;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Smallest possible frame: marker, length and checksum with an empty payload.
pub const MIN_FRAME_SIZE: usize = 1 + LENGTH_SIZE + CHECKSUM_SIZE;

fn payload_len(payload: &[u8]) -> Result<u16, EncodeError> {
    u16::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD_SIZE,
    })
}

fn frame_size(payload: &[u8], len: u16, crc: u32) -> usize {
    // Escaping does not depend on field order, only on the byte values.
    1 + escaped_size(&len.to_le_bytes())
        + escaped_size(payload)
        + escaped_size(&crc.to_le_bytes())
}

/// Returns the exact number of wire bytes needed to encode `payload`.
///
/// The result is the same for either [`ByteOrder`]. Payloads longer than
/// [`MAX_PAYLOAD_SIZE`] cannot be encoded; for those the length field is
/// counted as unescaped.
#[must_use]
pub fn encoded_size(payload: &[u8]) -> usize {
    let crc = compute_checksum(payload);
    match u16::try_from(payload.len()) {
        Ok(len) => frame_size(payload, len, crc),
        Err(_) => 1 + LENGTH_SIZE + escaped_size(payload) + escaped_size(&crc.to_le_bytes()),
    }
}

/// Emits every wire byte of a frame, returning the count emitted.
pub(crate) fn write_frame(
    order: ByteOrder,
    payload: &[u8],
    len: u16,
    crc: u32,
    mut emit: impl FnMut(u8),
) -> usize {
    let mut written = 1;
    emit(BOUNDARY_MARKER);

    let mut put = |byte: u8| {
        let escaped = escape_byte(byte);
        written += escaped.len();
        escaped.for_each(&mut emit);
    };

    for b in order.length_bytes(len) {
        put(b);
    }
    for &b in payload {
        put(b);
    }
    for b in order.checksum_bytes(crc) {
        put(b);
    }

    written
}

/// Encodes `payload` into `buffer`, returning the number of bytes written.
///
/// Nothing is written unless the whole frame fits.
///
/// # Errors
///
/// - [`EncodeError::BufferTooSmall`] if `buffer` is shorter than
///   [`MIN_FRAME_SIZE`] or than [`encoded_size`] of the payload.
/// - [`EncodeError::PayloadTooLarge`] if the payload exceeds
///   [`MAX_PAYLOAD_SIZE`].
///
/// # Example
///
/// ```
/// use simplehdlc::{ByteOrder, encode_to_buffer};
///
/// let mut buf = [0u8; 16];
/// let n = encode_to_buffer(ByteOrder::Little, &mut buf, &[1]).unwrap();
/// assert_eq!(&buf[..n], &[0x7E, 0x01, 0x00, 0x01, 0x1B, 0xDF, 0x05, 0xA5]);
/// ```
pub fn encode_to_buffer(
    order: ByteOrder,
    buffer: &mut [u8],
    payload: &[u8],
) -> Result<usize, EncodeError> {
    let len = payload_len(payload)?;
    let crc = compute_checksum(payload);
    let expected = frame_size(payload, len, crc);

    if buffer.len() < MIN_FRAME_SIZE || buffer.len() < expected {
        return Err(EncodeError::BufferTooSmall {
            needed: expected.max(MIN_FRAME_SIZE),
            capacity: buffer.len(),
        });
    }

    let mut index = 0;
    let written = write_frame(order, payload, len, crc, |b| {
        if let Some(slot) = buffer.get_mut(index) {
            *slot = b;
        }
        index += 1;
    });

    if written != expected {
        return Err(EncodeError::LengthMismatch { expected, written });
    }

    Ok(written)
}

/// Encodes `payload` into a freshly allocated buffer.
///
/// # Errors
///
/// Returns [`EncodeError::PayloadTooLarge`] if the payload exceeds
/// [`MAX_PAYLOAD_SIZE`].
pub fn encode_frame(order: ByteOrder, payload: &[u8]) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::zeroed(encoded_size(payload).max(MIN_FRAME_SIZE));
    let n = encode_to_buffer(order, &mut buf, payload)?;
    buf.truncate(n);
    Ok(buf.freeze())
}

/// Checks the payload length and returns it with the payload checksum.
pub(crate) fn prepare(payload: &[u8]) -> Result<(u16, u32), EncodeError> {
    let len = payload_len(payload)?;
    Ok((len, compute_checksum(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESCAPED_LE: [u8; 11] = [
        0x7E, 0x02, 0x00, 0x7D, 0x5E, 0x7D, 0x5D, 0x06, 0x4B, 0xD1, 0xDE,
    ];

    #[test]
    fn test_encode_simple_little() {
        let mut buf = [0u8; 8];
        let n = encode_to_buffer(ByteOrder::Little, &mut buf, &[1]).unwrap();
        assert_eq!(n, 8);
        assert_eq!(n, encoded_size(&[1]));
        assert_eq!(buf, [0x7E, 0x01, 0x00, 0x01, 0x1B, 0xDF, 0x05, 0xA5]);
    }

    #[test]
    fn test_encode_simple_big() {
        let mut buf = [0u8; 8];
        let n = encode_to_buffer(ByteOrder::Big, &mut buf, &[1]).unwrap();
        assert_eq!(n, 8);
        assert_eq!(buf, [0x7E, 0x00, 0x01, 0x01, 0xA5, 0x05, 0xDF, 0x1B]);
    }

    #[test]
    fn test_encode_escaping() {
        let payload = [0x7E, 0x7D];
        let mut buf = [0u8; 11];
        let n = encode_to_buffer(ByteOrder::Little, &mut buf, &payload).unwrap();
        assert_eq!(n, 11);
        assert_eq!(n, encoded_size(&payload));
        assert_eq!(buf, ESCAPED_LE);

        let n = encode_to_buffer(ByteOrder::Big, &mut buf, &payload).unwrap();
        assert_eq!(
            &buf[..n],
            &[0x7E, 0x00, 0x02, 0x7D, 0x5E, 0x7D, 0x5D, 0xDE, 0xD1, 0x4B, 0x06]
        );
    }

    #[test]
    fn test_encode_too_small() {
        for capacity in 0..MIN_FRAME_SIZE {
            let mut buf = vec![0xAA; capacity];
            let err = encode_to_buffer(ByteOrder::Little, &mut buf, &[1]).unwrap_err();
            assert!(matches!(err, EncodeError::BufferTooSmall { .. }));
            assert!(buf.iter().all(|&b| b == 0xAA));
        }
    }

    #[test]
    fn test_encode_one_short_writes_nothing() {
        let payload = [0x7E, 0x7D];
        let mut buf = [0xAA; 10];
        assert_eq!(
            encode_to_buffer(ByteOrder::Little, &mut buf, &payload),
            Err(EncodeError::BufferTooSmall {
                needed: 11,
                capacity: 10
            })
        );
        assert_eq!(buf, [0xAA; 10]);
    }

    #[test]
    fn test_encode_zero_length_payload() {
        let mut buf = [0u8; MIN_FRAME_SIZE];
        let n = encode_to_buffer(ByteOrder::Little, &mut buf, &[]).unwrap();
        assert_eq!(n, 7);
        assert_eq!(n, encoded_size(&[]));
        // CRC of nothing is zero
        assert_eq!(buf, [0x7E, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_escaped_length_field() {
        // 126 == 0x7E, so the length byte itself must be escaped
        let payload = vec![0u8; 126];
        let frame = encode_frame(ByteOrder::Little, &payload).unwrap();
        assert_eq!(&frame[..4], &[0x7E, 0x7D, 0x5E, 0x00]);
        assert_eq!(frame.len(), encoded_size(&payload));
    }

    #[test]
    fn test_encode_payload_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let mut buf = vec![0u8; MAX_PAYLOAD_SIZE + 64];
        assert_eq!(
            encode_to_buffer(ByteOrder::Little, &mut buf, &payload),
            Err(EncodeError::PayloadTooLarge {
                size: MAX_PAYLOAD_SIZE + 1,
                max: MAX_PAYLOAD_SIZE
            })
        );
    }

    #[test]
    fn test_encode_frame_matches_buffer() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut buf = [0u8; 512];
        let n = encode_to_buffer(ByteOrder::Big, &mut buf, &payload).unwrap();
        let frame = encode_frame(ByteOrder::Big, &payload).unwrap();
        assert_eq!(&frame[..], &buf[..n]);
    }

    #[test]
    fn test_write_frame_counts_bytes() {
        let payload = [0x7E, 1, 0x7D];
        let (len, crc) = prepare(&payload).unwrap();
        let mut out = Vec::new();
        let written = write_frame(ByteOrder::Little, &payload, len, crc, |b| out.push(b));
        assert_eq!(written, out.len());
        assert_eq!(written, encoded_size(&payload));
    }
}
