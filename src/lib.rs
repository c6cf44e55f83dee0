//! # simplehdlc
//!
//! HDLC-style framing for byte-oriented links such as serial ports.
//!
//! Each message travels as a frame: a boundary marker, a 2-byte length, the
//! payload and a CRC-32, with reserved bytes escaped so the marker never
//! appears inside a frame. The receiver resynchronizes on every marker and
//! silently drops frames that are truncated, oversized or corrupted.
//!
//! ## Features
//!
//! - Allocation-free parser and encoder over caller-owned buffers
//! - Resumable parsing across arbitrary read boundaries
//! - Little- or big-endian length and checksum fields
//! - Async serial transport using Tokio
//!
//! ## Quick Start
//!
//! ```
//! use simplehdlc::{ByteOrder, Framer, Handlers, encode_to_buffer, encoded_size};
//!
//! let payload = [0x7E, 0x01, 0x7D];
//! let mut wire = [0u8; 32];
//! let n = encode_to_buffer(ByteOrder::Little, &mut wire, &payload)?;
//! assert_eq!(n, encoded_size(&payload));
//!
//! let mut received = Vec::new();
//! let mut on_packet = |p: &[u8]| received.push(p.to_vec());
//! let mut rx = [0u8; 64];
//! let mut framer = Framer::new(&mut rx, ByteOrder::Little, Handlers::new().on_packet(&mut on_packet));
//!
//! // Bytes may arrive in any number of pieces
//! let (head, tail) = wire[..n].split_at(4);
//! framer.parse(head);
//! framer.parse(tail);
//! drop(framer);
//!
//! assert_eq!(received, vec![payload.to_vec()]);
//! # Ok::<(), simplehdlc::EncodeError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Checksum, byte stuffing, encoder and [`Framer`]
//! - [`transport`] - Transport implementations (currently USB/Serial)

pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use error::{Callback, EncodeError, Error, Result};
pub use protocol::{
    BOUNDARY_MARKER, ByteOrder, CHECKSUM_SIZE, ESCAPE_MARKER, ESCAPE_MASK, Framer, FramerStats,
    Handlers, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, ParserState, compute_checksum, encode_frame,
    encode_to_buffer, encoded_size, escaped_size,
};
pub use transport::{SerialConfig, SerialTransport, Transport, serial::list_ports};
