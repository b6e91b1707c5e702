//! Streaming reader for Mach-O and fat container headers.

use crate::endian::Endian;
use crate::header::{
    CommandType, CpuType, FatArch, FileType, HeaderFlags, HeaderKind, LoadCommand, MachHeader,
    SegmentCommand, VmProtection,
};
use crate::stream::PeekStream;
use anyhow::{bail, Result};
use std::io::Read;

const FAT_MAGIC: u32 = 0xCAFE_BABE;
const MH_MAGIC: u32 = 0xFEED_FACE;
const MH_CIGAM: u32 = 0xCEFA_EDFE;
const MH_MAGIC_64: u32 = 0xFEED_FACF;
const MH_CIGAM_64: u32 = 0xCFFA_EDFE;

/// Chunk size used when skipping forward to an architecture offset.
const SKIP_CHUNK: usize = 1024;

/// Top-level probe result: a fat container table or a bare Mach header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Fat container; carries the architecture count that follows the magic.
    Fat { nfat_arch: u32 },
    Mach(MachHeader),
}

/// Decodes Mach-O and fat headers from a forward-only byte stream.
///
/// The reader peeks a 4-byte magic before committing to a format, so a
/// failed probe leaves the stream position unchanged for the next attempt.
/// Byte order starts big-endian and flips once when a byte-swapped Mach
/// magic is seen; the flipped order then applies to every subsequent field
/// read, through both the peeking and the consuming surface.
///
/// The caller drives the protocol: [`try_read_header`], then for a fat
/// container [`read_fat_arch`] per table entry and, per architecture,
/// [`seek_arch`] followed by [`try_read_mach_header`]; load commands are
/// iterated with [`read_load_command`] until the header's declared
/// `sizeof_cmds` is exhausted, decoding segment commands with
/// [`read_segment_command`] and skipping everything else with [`skip`].
///
/// [`try_read_header`]: MachReader::try_read_header
/// [`read_fat_arch`]: MachReader::read_fat_arch
/// [`seek_arch`]: MachReader::seek_arch
/// [`try_read_mach_header`]: MachReader::try_read_mach_header
/// [`read_load_command`]: MachReader::read_load_command
/// [`read_segment_command`]: MachReader::read_segment_command
/// [`skip`]: MachReader::skip
pub struct MachReader<R> {
    stream: PeekStream<R>,
    order: Endian,
}

impl<R: Read> MachReader<R> {
    /// Creates a reader over the given byte source, initially big-endian.
    pub fn new(inner: R) -> Self {
        Self {
            stream: PeekStream::new(inner),
            order: Endian::Big,
        }
    }

    /// Bytes consumed from the stream so far; peeked bytes do not count.
    pub fn position(&self) -> u64 {
        self.stream.position()
    }

    /// Byte order currently in effect for field decoding.
    pub fn byte_order(&self) -> Endian {
        self.order
    }

    /// Probes the stream for a fat container first, then a bare Mach
    /// header. Returns `Ok(None)` with the stream untouched when neither
    /// magic matches.
    pub fn try_read_header(&mut self) -> Result<Option<Header>> {
        if let Some(nfat_arch) = self.try_read_fat_header()? {
            return Ok(Some(Header::Fat { nfat_arch }));
        }
        Ok(self.try_read_mach_header()?.map(Header::Mach))
    }

    /// Probes for the fat magic `0xCAFEBABE`. On a match, consumes the
    /// magic and reads the 32-bit architecture count; otherwise leaves the
    /// stream untouched and returns `Ok(None)`.
    pub fn try_read_fat_header(&mut self) -> Result<Option<u32>> {
        if !self.consume_magic(FAT_MAGIC)? {
            return Ok(None);
        }
        Ok(Some(self.read_u32()?))
    }

    /// Probes for one of the four Mach magics. On a match, consumes the
    /// magic, flips byte order if the magic is byte-swapped, and reads the
    /// fixed header fields (plus the reserved field of the 64-bit layout).
    /// Otherwise leaves the stream untouched and returns `Ok(None)`.
    pub fn try_read_mach_header(&mut self) -> Result<Option<MachHeader>> {
        let kind = match self.peek_u32()? {
            MH_MAGIC => HeaderKind::Bits32,
            MH_CIGAM => {
                self.order = self.order.flip();
                HeaderKind::Bits32
            }
            MH_MAGIC_64 => HeaderKind::Bits64,
            MH_CIGAM_64 => {
                self.order = self.order.flip();
                HeaderKind::Bits64
            }
            _ => return Ok(None),
        };
        self.read_u32()?; // magic

        let header = MachHeader {
            kind,
            cpu_type: CpuType(self.read_u32()?),
            cpu_subtype: self.read_u32()?,
            file_type: FileType(self.read_u32()?),
            ncmds: self.read_u32()?,
            sizeof_cmds: self.read_u32()?,
            flags: HeaderFlags(self.read_u32()?),
        };
        if kind == HeaderKind::Bits64 {
            self.read_u32()?; // reserved
        }
        Ok(Some(header))
    }

    /// Reads one fat architecture table entry in the current byte order.
    pub fn read_fat_arch(&mut self) -> Result<FatArch> {
        Ok(FatArch {
            cpu_type: CpuType(self.read_u32()?),
            cpu_subtype: self.read_u32()?,
            offset: self.read_u32()?,
            size: self.read_u32()?,
            align: self.read_u32()?,
        })
    }

    /// Advances the stream to the architecture's declared offset by reading
    /// and discarding the intervening bytes in bounded chunks.
    ///
    /// Fails with truncated-stream if the source ends first, and rejects a
    /// target offset behind the current position outright — fat files keep
    /// architecture offsets monotonically non-decreasing.
    pub fn seek_arch(&mut self, arch: &FatArch) -> Result<()> {
        let position = self.stream.position();
        if u64::from(arch.offset) < position {
            bail!(
                "architecture offset {:#x} is behind stream position {:#x}",
                arch.offset,
                position
            );
        }
        self.skip(u64::from(arch.offset) - position)
    }

    /// Reads and discards exactly `count` bytes.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let mut buffer = [0u8; SKIP_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let want = remaining.min(SKIP_CHUNK as u64) as usize;
            self.stream.read_exact(&mut buffer[..want])?;
            remaining -= want as u64;
        }
        Ok(())
    }

    /// Reads a load command header: type tag and total size (which includes
    /// the 8-byte header itself).
    pub fn read_load_command(&mut self) -> Result<LoadCommand> {
        Ok(LoadCommand {
            cmd: CommandType(self.read_u32()?),
            cmdsize: self.read_u32()?,
        })
    }

    /// Decodes the body of a segment command whose header was just read.
    ///
    /// Consumes the 16-byte name and eight 32-bit fields; any remainder of
    /// `header.cmdsize` (section descriptors, the wide halves of 64-bit
    /// fields) is left for the caller to [`skip`](MachReader::skip).
    pub fn read_segment_command(&mut self, header: &LoadCommand) -> Result<SegmentCommand> {
        Ok(SegmentCommand {
            cmdsize: header.cmdsize,
            segname: self.read_fixed_string(16)?,
            vmaddr: self.read_u32()?,
            vmsize: self.read_u32()?,
            fileoff: self.read_u32()?,
            filesize: self.read_u32()?,
            maxprot: VmProtection(self.read_i32()?),
            initprot: VmProtection(self.read_i32()?),
            nsects: self.read_u32()?,
            flags: self.read_u32()?,
        })
    }

    /// Peeks the magic and, only on an exact match, consumes it.
    fn consume_magic(&mut self, value: u32) -> Result<bool> {
        if self.peek_u32()? != value {
            return Ok(false);
        }
        self.read_u32()?; // magic
        Ok(true)
    }

    fn peek_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.stream.peek(&mut buf)?;
        Ok(self.order.read_u32(&buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf)?;
        Ok(self.order.read_u32(&buf))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf)?;
        Ok(self.order.read_i32(&buf))
    }

    /// Reads a fixed-width, NUL-padded text field, stripping the padding.
    fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf)?;
        while buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
