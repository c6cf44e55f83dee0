//! Framing protocol.
//!
//! This module contains the allocation-free framing core:
//! - CRC-32 checksum
//! - Byte stuffing
//! - Frame encoding
//! - Streaming frame parsing

pub mod checksum;
pub mod encoder;
pub mod handler;
pub mod order;
pub mod parser;
pub mod stuffing;

pub use checksum::{CHECKSUM_SIZE, compute_checksum};
pub use encoder::{
    LENGTH_SIZE, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, encode_frame, encode_to_buffer, encoded_size,
};
pub use handler::Handlers;
pub use order::ByteOrder;
pub use parser::{Framer, FramerStats, MIN_BODY_SIZE, ParserState};
pub use stuffing::{BOUNDARY_MARKER, ESCAPE_MARKER, ESCAPE_MASK, escaped_size};
