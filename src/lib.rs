//! Streaming prober for Mach-O and fat (universal) binary headers.
//!
//! This library decodes Mach-O headers, fat architecture tables, load
//! commands, and segment commands directly from a forward-only byte
//! stream, detecting format and byte order from the leading magic number
//! without loading the whole file.

pub mod endian;
pub mod header;
pub mod reader;
pub mod stream;

pub use endian::Endian;
pub use header::{
    CommandType, CpuType, FatArch, FileType, HeaderFlags, HeaderKind, LoadCommand, MachHeader,
    SegmentCommand, VmProtection,
};
pub use reader::{Header, MachReader};
