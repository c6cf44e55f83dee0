//! Streaming frame parser.
//!
//! [`Framer`] holds the per-connection state: a caller-owned receive buffer,
//! the parser state machine and the [`Handlers`] it reports to. Bytes may be
//! fed in chunks split at any offset; the result is the same as feeding the
//! whole stream at once.
//!
//! Malformed input never produces an error. Frames with an out-of-range
//! length, a bad checksum or an interrupting marker are dropped and the
//! parser waits for the next marker. Drops are counted in [`FramerStats`]
//! and logged at debug level.

use super::checksum::{CHECKSUM_SIZE, compute_checksum};
use super::encoder::{prepare, write_frame};
use super::handler::Handlers;
use super::order::ByteOrder;
use super::stuffing::{BOUNDARY_MARKER, Unescaper};
use crate::error::{Callback, EncodeError};

/// Smallest accepted frame body: one payload byte plus the checksum.
pub const MIN_BODY_SIZE: usize = 1 + CHECKSUM_SIZE;

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Discarding bytes until a boundary marker.
    #[default]
    AwaitingMarker,
    /// Expecting the first length byte in wire order.
    ReadingLengthFirst,
    /// Expecting the second length byte in wire order.
    ReadingLengthSecond,
    /// Reading payload and checksum bytes.
    ReadingPayload,
}

/// Counters describing what the parser has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerStats {
    /// Frames delivered to the packet handler.
    pub frames: u64,
    /// Frames whose declared length was out of range.
    pub length_rejected: u64,
    /// Frames whose checksum did not match.
    pub checksum_failed: u64,
    /// Frames cut short by a new marker.
    pub abandoned: u64,
    /// Bytes discarded while waiting for a marker.
    pub noise_bytes: u64,
}

/// Frame parser and encoder for one connection.
///
/// # Example
///
/// ```
/// use simplehdlc::{ByteOrder, Framer, Handlers, encode_frame};
///
/// let frame = encode_frame(ByteOrder::Little, b"hello").unwrap();
///
/// let mut received = Vec::new();
/// let mut on_packet = |p: &[u8]| received.push(p.to_vec());
/// let mut rx = [0u8; 64];
/// let mut framer = Framer::new(&mut rx, ByteOrder::Little, Handlers::new().on_packet(&mut on_packet));
/// framer.parse(&frame);
/// drop(framer);
///
/// assert_eq!(received, vec![b"hello".to_vec()]);
/// ```
#[derive(Debug)]
pub struct Framer<'a> {
    rx_buffer: &'a mut [u8],
    order: ByteOrder,
    handlers: Handlers<'a>,
    state: ParserState,
    unescaper: Unescaper,
    expected_len: usize,
    rx_count: usize,
    rx_crc: u32,
    stats: FramerStats,
}

impl<'a> Framer<'a> {
    /// Creates a framer over a caller-owned receive buffer.
    ///
    /// The buffer must hold the payload plus the 4 checksum bytes of the
    /// largest frame to be accepted.
    #[must_use]
    pub fn new(rx_buffer: &'a mut [u8], order: ByteOrder, handlers: Handlers<'a>) -> Self {
        Self {
            rx_buffer,
            order,
            handlers,
            state: ParserState::AwaitingMarker,
            unescaper: Unescaper::new(),
            expected_len: 0,
            rx_count: 0,
            rx_crc: 0,
            stats: FramerStats::default(),
        }
    }

    /// Returns the configured byte order.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Returns the receive buffer capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Returns the largest payload this framer can accept.
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        self.rx_buffer.len().saturating_sub(CHECKSUM_SIZE)
    }

    /// Returns the current parser state.
    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Returns the parser counters.
    #[must_use]
    pub const fn stats(&self) -> FramerStats {
        self.stats
    }

    /// Abandons any partial frame and waits for the next marker.
    pub fn reset(&mut self) {
        self.begin_frame();
        self.state = ParserState::AwaitingMarker;
    }

    fn begin_frame(&mut self) {
        self.expected_len = 0;
        self.rx_count = 0;
        self.rx_crc = 0;
        self.unescaper.reset();
    }

    /// Feeds received bytes to the parser.
    ///
    /// The packet handler runs in-line for every valid frame completed by
    /// these bytes.
    pub fn parse(&mut self, data: &[u8]) {
        for &byte in data {
            self.parse_byte(byte);
        }
    }

    fn parse_byte(&mut self, byte: u8) {
        if byte == BOUNDARY_MARKER {
            if self.state != ParserState::AwaitingMarker {
                self.stats.abandoned += 1;
                tracing::debug!(
                    state = ?self.state,
                    received = self.rx_count,
                    "frame abandoned by new marker"
                );
            }
            self.begin_frame();
            self.state = ParserState::ReadingLengthFirst;
            return;
        }

        if self.state == ParserState::AwaitingMarker {
            self.stats.noise_bytes += 1;
            return;
        }

        let Some(c) = self.unescaper.feed(byte) else {
            return;
        };

        match self.state {
            ParserState::AwaitingMarker => {}
            ParserState::ReadingLengthFirst => {
                self.expected_len = usize::from(c) << self.order.length_shift(0);
                self.state = ParserState::ReadingLengthSecond;
            }
            ParserState::ReadingLengthSecond => {
                self.expected_len |= usize::from(c) << self.order.length_shift(1);
                self.expected_len += CHECKSUM_SIZE;

                if self.expected_len > self.rx_buffer.len() || self.expected_len < MIN_BODY_SIZE {
                    self.stats.length_rejected += 1;
                    tracing::debug!(
                        declared = self.expected_len - CHECKSUM_SIZE,
                        capacity = self.rx_buffer.len(),
                        "frame length out of range"
                    );
                    self.state = ParserState::AwaitingMarker;
                } else {
                    self.state = ParserState::ReadingPayload;
                }
            }
            ParserState::ReadingPayload => self.consume_body(c),
        }
    }

    fn consume_body(&mut self, c: u8) {
        let payload_len = self.expected_len - CHECKSUM_SIZE;

        if self.rx_count < payload_len {
            self.rx_buffer[self.rx_count] = c;
            self.rx_count += 1;
            return;
        }

        self.rx_crc = self.order.push_checksum_byte(self.rx_crc, c);
        self.rx_count += 1;

        if self.rx_count < self.expected_len {
            return;
        }

        let payload = &self.rx_buffer[..payload_len];
        let crc = compute_checksum(payload);
        if crc == self.rx_crc {
            self.stats.frames += 1;
            tracing::trace!(len = payload_len, "frame decoded");
            self.handlers.packet(payload);
        } else {
            self.stats.checksum_failed += 1;
            tracing::debug!(
                expected = format_args!("{:#010x}", self.rx_crc),
                computed = format_args!("{crc:#010x}"),
                len = payload_len,
                "frame checksum mismatch"
            );
        }
        self.state = ParserState::AwaitingMarker;
    }

    /// Encodes `payload` through the byte sink, one call per wire byte.
    ///
    /// When `flush` is set the flush handler runs after the last byte.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::CallbackMissing`] if the byte sink is not set, or
    ///   `flush` is requested without a flush handler.
    /// - [`EncodeError::PayloadTooLarge`] if the payload does not fit the
    ///   length field.
    ///
    /// All checks happen before the first byte is emitted.
    pub fn encode_to_sink(&mut self, payload: &[u8], flush: bool) -> Result<(), EncodeError> {
        if !self.handlers.has_byte() {
            return Err(EncodeError::CallbackMissing(Callback::Byte));
        }
        if flush && !self.handlers.has_flush() {
            return Err(EncodeError::CallbackMissing(Callback::Flush));
        }
        let (len, crc) = prepare(payload)?;

        let order = self.order;
        let sink = self
            .handlers
            .byte_sink()
            .ok_or(EncodeError::CallbackMissing(Callback::Byte))?;
        let written = write_frame(order, payload, len, crc, sink);
        tracing::trace!(len = payload.len(), written, "frame sent to sink");

        if flush {
            self.handlers.flush();
        }
        Ok(())
    }

    /// Encodes `payload` into `buffer` using this framer's byte order.
    ///
    /// See [`encode_to_buffer`](super::encode_to_buffer).
    pub fn encode_to_buffer(&self, buffer: &mut [u8], payload: &[u8]) -> Result<usize, EncodeError> {
        super::encode_to_buffer(self.order, buffer, payload)
    }
}
