//! CRC-32 checksum used for frame integrity.
//!
//! The variant is CRC-32/ISO-HDLC: reflected polynomial `0xEDB88320`,
//! initial value `0xFFFFFFFF`, final XOR `0xFFFFFFFF`.

/// Size of the checksum field in bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// Computes the CRC-32/ISO-HDLC checksum of `data`.
#[inline]
#[must_use]
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
