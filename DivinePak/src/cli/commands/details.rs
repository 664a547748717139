//! CLI command for printing archive and entry details

use std::path::Path;

use anyhow::Context;

use crate::cli::format::format_size;
use crate::pak::PakReader;

/// Print the archive header, or one entry's table record
///
/// # Errors
/// Returns an error if the archive cannot be opened or `path` is not in it.
pub fn execute(source: &Path, path: Option<&str>) -> anyhow::Result<()> {
    let reader = PakReader::open(source)?;

    if let Some(path) = path {
        let entry = reader
            .entry(path)
            .with_context(|| format!("file not found in archive: {path}"))?;

        println!("Name: {}", entry.name);
        println!("Offset: {:#04X}", entry.offset);
        println!("Compressed Size: {}", format_size(u64::from(entry.size)));
        println!("Decompressed Size: {}", format_size(u64::from(entry.real_size)));
        println!("Sub-archive: {}", entry.archive_num);
        println!("Flags: {:#04X}", entry.flags);
        println!("Checksum: {:#010X}", entry.checksum);
        match entry.compression() {
            Ok(method) => println!("Compression: {}", method.as_str()),
            Err(_) => println!("Compression: unknown ({:#X})", entry.flags & 0x0F),
        }
    } else {
        let header = reader.header();
        println!("Version: {}", header.version);
        println!("File Table Offset: {:#04X}", header.file_table_offset);
        println!(
            "File Table Size (compressed): {}",
            format_size(u64::from(header.file_table_size))
        );
        println!("File Table Count: {}", reader.len());
        println!("Sub-archive count: {}", header.volume_count);
    }

    Ok(())
}
