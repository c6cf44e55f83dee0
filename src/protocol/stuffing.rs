//! Byte stuffing for frame bodies.
//!
//! Two byte values are reserved on the wire. [`BOUNDARY_MARKER`] starts a
//! frame and [`ESCAPE_MARKER`] introduces an escaped data byte. A reserved
//! value inside a frame body is sent as the escape byte followed by the
//! original value with [`ESCAPE_MASK`] flipped:
//!
//! ```text
//! 0x7E  ->  0x7D 0x5E
//! 0x7D  ->  0x7D 0x5D
//! ```

/// Frame boundary marker.
pub const BOUNDARY_MARKER: u8 = 0x7E;

/// Escape introducer.
pub const ESCAPE_MARKER: u8 = 0x7D;

/// Bit flipped on an escaped byte.
pub const ESCAPE_MASK: u8 = 0x20;

/// Returns true if `byte` must be escaped inside a frame body.
#[inline]
#[must_use]
pub const fn is_reserved(byte: u8) -> bool {
    byte == BOUNDARY_MARKER || byte == ESCAPE_MARKER
}

/// Number of bytes `data` occupies once escaped.
#[must_use]
pub fn escaped_size(data: &[u8]) -> usize {
    data.len() + data.iter().filter(|&&b| is_reserved(b)).count()
}

/// A single byte in its escaped wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaped {
    /// Byte sent unchanged.
    Plain(u8),
    /// Escape introducer followed by the flipped byte.
    Pair(u8),
}

impl Escaped {
    /// Number of wire bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Plain(_) => 1,
            Self::Pair(_) => 2,
        }
    }

    /// Always false; an escaped byte occupies at least one wire byte.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Passes each wire byte to `emit` in order.
    #[inline]
    pub fn for_each(self, mut emit: impl FnMut(u8)) {
        match self {
            Self::Plain(b) => emit(b),
            Self::Pair(b) => {
                emit(ESCAPE_MARKER);
                emit(b);
            }
        }
    }
}

/// Escapes a single byte.
#[inline]
#[must_use]
pub const fn escape_byte(byte: u8) -> Escaped {
    if is_reserved(byte) {
        Escaped::Pair(byte ^ ESCAPE_MASK)
    } else {
        Escaped::Plain(byte)
    }
}

/// Stateful inverse of [`escape_byte`].
///
/// Boundary markers are not handled here; callers must check for them
/// before unescaping, since a marker is always structural.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unescaper {
    pending: bool,
}

impl Unescaper {
    /// Creates an unescaper with no escape pending.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Feeds one wire byte.
    ///
    /// Returns the decoded data byte, or `None` if `byte` was an escape
    /// introducer and the data byte follows.
    #[inline]
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        if self.pending {
            self.pending = false;
            Some(byte ^ ESCAPE_MASK)
        } else if byte == ESCAPE_MARKER {
            self.pending = true;
            None
        } else {
            Some(byte)
        }
    }

    /// Returns true if an escape introducer was the last byte fed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drops any pending escape.
    pub fn reset(&mut self) {
        self.pending = false;
    }
}
