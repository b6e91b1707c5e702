use anyhow::{anyhow, Result};
use clap::Parser;
use macho_probe::{FatArch, MachReader};
use std::fs::File;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long)]
    input: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file = File::open(&args.input)?;
    let mut reader = MachReader::new(file);

    if let Some(nfat_arch) = reader.try_read_fat_header()? {
        println!("Fat container with {} architecture(s)", nfat_arch);

        let arches: Vec<FatArch> = (0..nfat_arch)
            .map(|_| reader.read_fat_arch())
            .collect::<Result<_>>()?;

        for arch in &arches {
            println!(
                "  {} subtype={:#x} offset={:#x} size={:#x} align=2^{}",
                arch.cpu_type, arch.cpu_subtype, arch.offset, arch.size, arch.align
            );
        }

        for arch in &arches {
            println!("Architecture {} at {:#x}:", arch.cpu_type, arch.offset);
            reader.seek_arch(arch)?;
            dump_image(&mut reader)?;
        }
    } else {
        // A failed fat probe leaves the stream untouched for the Mach probe.
        dump_image(&mut reader)?;
    }

    Ok(())
}

/// Probes a Mach header at the current position and walks its load
/// commands, printing segment commands in full and everything else as an
/// opaque type/size pair.
fn dump_image<R: Read>(reader: &mut MachReader<R>) -> Result<()> {
    let header = reader
        .try_read_mach_header()?
        .ok_or_else(|| anyhow!("no Mach-O magic at current position"))?;

    println!(
        "  {:?} {} filetype={} ncmds={} sizeofcmds={:#x} flags={}",
        header.kind, header.cpu_type, header.file_type, header.ncmds, header.sizeof_cmds,
        header.flags
    );

    for _ in 0..header.ncmds {
        let start = reader.position();
        let command = reader.read_load_command()?;

        if command.cmd.is_segment() {
            let segment = reader.read_segment_command(&command)?;
            println!(
                "    {} {} vmaddr={:#x} vmsize={:#x} fileoff={:#x} filesize={:#x} prot={}/{} nsects={}",
                command.cmd,
                segment.segname,
                segment.vmaddr,
                segment.vmsize,
                segment.fileoff,
                segment.filesize,
                segment.maxprot,
                segment.initprot,
                segment.nsects
            );
        } else {
            println!("    {} size={:#x}", command.cmd, command.cmdsize);
        }

        // Each command occupies exactly cmdsize bytes; skip whatever the
        // decode above did not consume.
        let consumed = reader.position() - start;
        reader.skip(u64::from(command.cmdsize).saturating_sub(consumed))?;
    }

    Ok(())
}
