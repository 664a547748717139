//! PAK archive operations module

pub mod lspk;

// Primary public API
pub use lspk::{
    CompressionMethod, EntryRef, FileTable, PakEntry, PakHeader, PakReader, VolumePool,
    volume_path,
};

use std::path::Path;

use crate::error::Result;

/// Names of every entry in the archive, in catalog order
///
/// # Errors
/// Returns an error if the archive cannot be opened.
pub fn list_pak_contents<P: AsRef<Path>>(pak: P) -> Result<Vec<String>> {
    let reader = PakReader::open(pak)?;
    Ok(reader.entries().map(|(name, _)| name.to_string()).collect())
}

/// Read a single decoded entry from an archive on disk
///
/// # Errors
/// Returns an error if the archive cannot be opened or the entry cannot be read.
pub fn read_file_bytes<P: AsRef<Path>>(pak: P, name: &str) -> Result<Vec<u8>> {
    let mut reader = PakReader::open(pak)?;
    reader.read(name)
}
