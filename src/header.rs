//! Value records decoded from Mach-O and fat headers.
//!
//! Enumeration-typed fields (CPU type, file type, flags, command type) are
//! thin wrappers over their raw on-disk width with a partial symbolic
//! table: values outside the named set round-trip as raw numbers instead
//! of failing, since the format tolerates forward-unknown values.

use std::fmt;

/// Whether a Mach header uses the 32-bit or 64-bit layout.
///
/// The 64-bit layout carries one extra reserved 32-bit field after the
/// fixed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Bits32,
    Bits64,
}

/// CPU architecture tag (`cputype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuType(pub u32);

impl CpuType {
    pub const X86: CpuType = CpuType(7);
    pub const X86_64: CpuType = CpuType(0x0100_0007);
    pub const ARM: CpuType = CpuType(12);
    pub const ARM64: CpuType = CpuType(0x0100_000c);
    pub const POWERPC: CpuType = CpuType(18);
    pub const POWERPC64: CpuType = CpuType(0x0100_0012);

    pub fn name(self) -> Option<&'static str> {
        match self {
            CpuType::X86 => Some("x86"),
            CpuType::X86_64 => Some("x86_64"),
            CpuType::ARM => Some("arm"),
            CpuType::ARM64 => Some("arm64"),
            CpuType::POWERPC => Some("ppc"),
            CpuType::POWERPC64 => Some("ppc64"),
            _ => None,
        }
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Mach-O file type (`filetype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType(pub u32);

impl FileType {
    pub const OBJECT: FileType = FileType(1);
    pub const EXECUTE: FileType = FileType(2);
    pub const CORE: FileType = FileType(4);
    pub const DYLIB: FileType = FileType(6);
    pub const DYLINKER: FileType = FileType(7);
    pub const BUNDLE: FileType = FileType(8);
    pub const DSYM: FileType = FileType(10);

    pub fn name(self) -> Option<&'static str> {
        match self {
            FileType::OBJECT => Some("object"),
            FileType::EXECUTE => Some("execute"),
            FileType::CORE => Some("core"),
            FileType::DYLIB => Some("dylib"),
            FileType::DYLINKER => Some("dylinker"),
            FileType::BUNDLE => Some("bundle"),
            FileType::DSYM => Some("dsym"),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Mach header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags(pub u32);

impl HeaderFlags {
    pub const NOUNDEFS: HeaderFlags = HeaderFlags(0x1);
    pub const DYLDLINK: HeaderFlags = HeaderFlags(0x4);
    pub const TWOLEVEL: HeaderFlags = HeaderFlags(0x80);
    pub const PIE: HeaderFlags = HeaderFlags(0x20_0000);

    pub fn contains(self, flag: HeaderFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl fmt::Display for HeaderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Load command type tag (`cmd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandType(pub u32);

impl CommandType {
    pub const SEGMENT: CommandType = CommandType(0x1);
    pub const SYMTAB: CommandType = CommandType(0x2);
    pub const DYSYMTAB: CommandType = CommandType(0xb);
    pub const LOAD_DYLIB: CommandType = CommandType(0xc);
    pub const ID_DYLIB: CommandType = CommandType(0xd);
    pub const SEGMENT_64: CommandType = CommandType(0x19);
    pub const UUID: CommandType = CommandType(0x1b);
    pub const MAIN: CommandType = CommandType(0x8000_0028);

    /// True for both the 32-bit and 64-bit segment command tags.
    pub fn is_segment(self) -> bool {
        self == CommandType::SEGMENT || self == CommandType::SEGMENT_64
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            CommandType::SEGMENT => Some("LC_SEGMENT"),
            CommandType::SYMTAB => Some("LC_SYMTAB"),
            CommandType::DYSYMTAB => Some("LC_DYSYMTAB"),
            CommandType::LOAD_DYLIB => Some("LC_LOAD_DYLIB"),
            CommandType::ID_DYLIB => Some("LC_ID_DYLIB"),
            CommandType::SEGMENT_64 => Some("LC_SEGMENT_64"),
            CommandType::UUID => Some("LC_UUID"),
            CommandType::MAIN => Some("LC_MAIN"),
            _ => None,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// VM protection bits (`maxprot` / `initprot`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmProtection(pub i32);

impl VmProtection {
    pub const READ: VmProtection = VmProtection(0x1);
    pub const WRITE: VmProtection = VmProtection(0x2);
    pub const EXECUTE: VmProtection = VmProtection(0x4);

    pub fn contains(self, prot: VmProtection) -> bool {
        self.0 & prot.0 == prot.0
    }
}

impl fmt::Display for VmProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (VmProtection::READ, 'r'),
            (VmProtection::WRITE, 'w'),
            (VmProtection::EXECUTE, 'x'),
        ];
        for (prot, c) in flags {
            write!(f, "{}", if self.contains(prot) { c } else { '-' })?;
        }
        Ok(())
    }
}

/// Fixed fields of a Mach header, one per probed architecture slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachHeader {
    pub kind: HeaderKind,
    pub cpu_type: CpuType,
    pub cpu_subtype: u32,
    pub file_type: FileType,
    pub ncmds: u32,
    pub sizeof_cmds: u32,
    pub flags: HeaderFlags,
}

/// One entry of a fat container's architecture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatArch {
    pub cpu_type: CpuType,
    pub cpu_subtype: u32,
    /// Byte offset of this architecture's Mach-O image within the container.
    pub offset: u32,
    /// Byte size of that image.
    pub size: u32,
    /// Required alignment, as a power-of-two exponent.
    pub align: u32,
}

/// Load command header: type tag plus total size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCommand {
    pub cmd: CommandType,
    /// Total command size in bytes, including this 8-byte header.
    pub cmdsize: u32,
}

impl LoadCommand {
    /// On-disk size of the command header itself.
    pub const HEADER_SIZE: u32 = 8;
}

/// Decoded body of a segment load command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCommand {
    /// Total size of the owning load command, carried over from its header.
    pub cmdsize: u32,
    /// Segment name, trailing NUL padding stripped.
    pub segname: String,
    pub vmaddr: u32,
    pub vmsize: u32,
    pub fileoff: u32,
    pub filesize: u32,
    pub maxprot: VmProtection,
    pub initprot: VmProtection,
    pub nsects: u32,
    pub flags: u32,
}
