//! Byte order of the length and checksum fields.

/// Byte order used for the 2-byte length and 4-byte checksum fields.
///
/// Both ends of a link must agree. The payload itself is never reordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Serializes a length field.
    #[must_use]
    pub const fn length_bytes(self, len: u16) -> [u8; 2] {
        match self {
            Self::Little => len.to_le_bytes(),
            Self::Big => len.to_be_bytes(),
        }
    }

    /// Serializes a checksum field.
    #[must_use]
    pub const fn checksum_bytes(self, crc: u32) -> [u8; 4] {
        match self {
            Self::Little => crc.to_le_bytes(),
            Self::Big => crc.to_be_bytes(),
        }
    }

    /// Bit shift for the length byte at `index` (0 or 1) in wire order.
    #[must_use]
    pub(crate) const fn length_shift(self, index: usize) -> u32 {
        match (self, index) {
            (Self::Little, 0) | (Self::Big, 1) => 0,
            _ => 8,
        }
    }

    /// Folds the next wire byte of a checksum field into `acc`.
    ///
    /// After all four bytes have been folded, `acc` holds the checksum value.
    #[must_use]
    pub(crate) const fn push_checksum_byte(self, acc: u32, byte: u8) -> u32 {
        match self {
            Self::Little => (acc >> 8) | ((byte as u32) << 24),
            Self::Big => (acc << 8) | byte as u32,
        }
    }
}
