//! Error types for the simplehdlc library.

use thiserror::Error;

/// The main error type for simplehdlc operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,
}

/// Callback that an encode operation needed but found unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    /// The per-byte output sink.
    Byte,
    /// The flush signal.
    Flush,
}

impl std::fmt::Display for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Byte => f.write_str("on_byte"),
            Self::Flush => f.write_str("on_flush"),
        }
    }
}

/// Frame encoding errors.
///
/// Every variant is reported before any output is produced, except
/// [`EncodeError::LengthMismatch`] which signals an internal inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Destination buffer cannot hold the encoded frame.
    #[error("buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// A required output callback is not configured.
    #[error("callback missing: {0}")]
    CallbackMissing(Callback),

    /// Payload does not fit the 16-bit length field.
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Bytes written disagree with the precomputed frame size.
    #[error("internal encode length mismatch: expected {expected} bytes, wrote {written}")]
    LengthMismatch { expected: usize, written: usize },
}

/// Result type alias for simplehdlc operations.
pub type Result<T> = std::result::Result<T, Error>;
