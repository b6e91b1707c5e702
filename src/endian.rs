//! Run-time switchable byte-order decoding for fixed-width integers.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order used to decode multi-byte fields.
///
/// Mach-O streams start out big-endian (fat headers are always written that
/// way); a byte-swapped Mach magic flips the order for every field read
/// after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Returns the opposite byte order.
    pub fn flip(self) -> Endian {
        match self {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }

    pub fn read_u16(self, buf: &[u8; 2]) -> u16 {
        match self {
            Endian::Big => BigEndian::read_u16(buf),
            Endian::Little => LittleEndian::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8; 4]) -> u32 {
        match self {
            Endian::Big => BigEndian::read_u32(buf),
            Endian::Little => LittleEndian::read_u32(buf),
        }
    }

    pub fn read_u64(self, buf: &[u8; 8]) -> u64 {
        match self {
            Endian::Big => BigEndian::read_u64(buf),
            Endian::Little => LittleEndian::read_u64(buf),
        }
    }

    pub fn read_i32(self, buf: &[u8; 4]) -> i32 {
        match self {
            Endian::Big => BigEndian::read_i32(buf),
            Endian::Little => LittleEndian::read_i32(buf),
        }
    }
}
