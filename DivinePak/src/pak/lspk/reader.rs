//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 2015 Norbyte (`LSLib`, MIT)
//!
//! SPDX-License-Identifier: MIT
//!
//! LSPK PAK file reader

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::volumes::VolumePool;
use super::{
    ENTRY_SIZE, FileTable, HEADER_SIZE, MAGIC, NAME_LENGTH, PakEntry, PakHeader,
    SUPPORTED_VERSION, TRAILER_SIZE,
};
use crate::compression::{decompress_entry, decompress_lz4_block};
use crate::error::{Error, FormatError, IoError, Result};

pub use super::volumes::ReadSource;

/// Read `size` bytes from the current position, reporting a short source as [`IoError::Truncated`]
fn read_bytes<R: Read + Seek>(source: &mut R, size: usize) -> Result<Vec<u8>> {
    let offset = source.stream_position()?;
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(offset))?;

    let available = len.saturating_sub(offset);
    if size as u64 > available {
        return Err(IoError::Truncated {
            offset,
            expected: size,
            available: usize::try_from(available).unwrap_or(usize::MAX),
        }
        .into());
    }

    let mut buffer = vec![0u8; size];
    source.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Locate and parse the PAK header from the trailer at end of file
///
/// Returns the header along with the trailer's header distance.
///
/// # Errors
/// Returns [`FormatError::BadMagic`] if the trailer signature is wrong,
/// [`FormatError::HeaderOutOfBounds`] if the trailer points outside the file,
/// and [`FormatError::UnsupportedVersion`] for any version other than 13.
pub fn locate_header<R: Read + Seek>(source: &mut R) -> Result<(PakHeader, u32)> {
    let file_len = source.seek(SeekFrom::End(0))?;
    if file_len < TRAILER_SIZE {
        return Err(FormatError::BadMagic.into());
    }

    source.seek(SeekFrom::Start(file_len - TRAILER_SIZE))?;
    let trailer_offset = source.read_u32::<LittleEndian>()?;

    let mut magic = [0u8; 4];
    source.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic.into());
    }

    let header_start = file_len
        .checked_sub(u64::from(trailer_offset))
        .filter(|start| start + HEADER_SIZE as u64 <= file_len)
        .ok_or(FormatError::HeaderOutOfBounds {
            trailer_offset,
            file_len,
        })?;
    source.seek(SeekFrom::Start(header_start))?;

    let mut header_bytes = [0u8; HEADER_SIZE];
    source.read_exact(&mut header_bytes)?;
    let mut cursor = Cursor::new(&header_bytes[..]);

    let header = PakHeader {
        version: cursor.read_u32::<LittleEndian>()?,
        file_table_offset: cursor.read_u32::<LittleEndian>()?,
        file_table_size: cursor.read_u32::<LittleEndian>()?,
        volume_count: cursor.read_u16::<LittleEndian>()?,
        reserved: cursor.read_u16::<LittleEndian>()?,
    };

    if header.version != SUPPORTED_VERSION {
        return Err(FormatError::UnsupportedVersion(header.version).into());
    }

    tracing::debug!(
        "PAK header at {header_start}: version {}, table at {} ({} bytes), {} volume(s)",
        header.version,
        header.file_table_offset,
        header.file_table_size,
        header.volume_count
    );

    Ok((header, trailer_offset))
}

/// Parse a single 280-byte file table record
///
/// # Errors
/// Returns [`FormatError::InvalidName`] if the name field is not valid UTF-8.
pub fn parse_file_entry(bytes: &[u8; ENTRY_SIZE], index: usize) -> Result<PakEntry> {
    // The whole padded field must decode; only trailing NULs are dropped
    let name = std::str::from_utf8(&bytes[..NAME_LENGTH])
        .map_err(|_| FormatError::InvalidName { index })?
        .trim_end_matches('\0')
        .to_string();

    let mut cursor = Cursor::new(&bytes[NAME_LENGTH..]);

    Ok(PakEntry {
        name,
        offset: cursor.read_u32::<LittleEndian>()?,
        size: cursor.read_u32::<LittleEndian>()?,
        real_size: cursor.read_u32::<LittleEndian>()?,
        archive_num: cursor.read_u32::<LittleEndian>()?,
        flags: cursor.read_u32::<LittleEndian>()?,
        checksum: cursor.read_u32::<LittleEndian>()?,
    })
}

/// Read, decompress and parse the file table
///
/// # Errors
/// Returns [`FormatError::TruncatedTable`] if the table decodes to fewer bytes
/// than its entry count requires, [`FormatError::CorruptTable`] if the LZ4
/// block is invalid, and [`FormatError::InvalidName`] for non-UTF-8 names.
pub fn decode_file_table<R: Read + Seek>(source: &mut R, header: &PakHeader) -> Result<FileTable> {
    source.seek(SeekFrom::Start(u64::from(header.file_table_offset)))?;

    let num_files = source.read_u32::<LittleEndian>()? as usize;
    let table_size_compressed = header
        .file_table_size
        .checked_sub(4)
        .ok_or(FormatError::TruncatedTable {
            expected: 4,
            actual: header.file_table_size as usize,
        })? as usize;
    let table_size_decompressed = num_files.checked_mul(ENTRY_SIZE).ok_or_else(|| {
        FormatError::CorruptTable(format!("entry count {num_files} is too large"))
    })?;

    let compressed_table = read_bytes(source, table_size_compressed)?;

    // The block has no length prefix; the size comes from the entry count
    let table = decompress_lz4_block(&compressed_table, table_size_decompressed)
        .map_err(|e| FormatError::CorruptTable(e.to_string()))?;

    if table.len() < table_size_decompressed {
        return Err(FormatError::TruncatedTable {
            expected: table_size_decompressed,
            actual: table.len(),
        }
        .into());
    }

    let mut file_table = FileTable::with_capacity(num_files);
    for (index, record) in table.chunks_exact(ENTRY_SIZE).enumerate() {
        let record: &[u8; ENTRY_SIZE] = record
            .try_into()
            .map_err(|_| FormatError::CorruptTable(format!("record {index} is misaligned")))?;
        let entry = parse_file_entry(record, index)?;

        if file_table.contains_key(&entry.name) {
            tracing::debug!("Duplicate entry '{}' at record {index}, keeping the later one", entry.name);
        }
        // IndexMap::insert keeps the first position and replaces the value
        file_table.insert(entry.name.clone(), entry);
    }

    tracing::debug!("Read file table: {num_files} record(s), {} unique name(s)", file_table.len());

    Ok(file_table)
}

/// LSPK PAK file reader
///
/// Construction reads the header and file table up front, so a `PakReader`
/// always holds a complete catalog. Reads take `&mut self`: seeking and
/// reading a handle is not atomic, so sharing a reader between threads
/// needs an outer lock.
pub struct PakReader<R: Read + Seek = BufReader<File>> {
    header: PakHeader,
    file_table: FileTable,
    volumes: VolumePool<R>,
}

impl PakReader<BufReader<File>> {
    /// Open a PAK archive on disk
    ///
    /// Split volumes are looked up next to `path` when first needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the header or file
    /// table is invalid. No handles stay open on failure.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening PAK: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), Some(path))
    }
}

impl<R: Read + Seek> PakReader<R> {
    /// Build a reader over any seekable source
    ///
    /// `path` is the main archive's location and is only used to find split
    /// volumes; without it only volume 0 can be read.
    ///
    /// # Errors
    /// Returns an error if the header or file table is invalid.
    pub fn from_reader(mut source: R, path: Option<&Path>) -> Result<Self> {
        let (header, _) = locate_header(&mut source)?;
        let file_table = decode_file_table(&mut source, &header)?;

        Ok(Self {
            header,
            file_table,
            volumes: VolumePool::new(source, path),
        })
    }

    /// The parsed archive header
    #[must_use]
    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    /// All entries in on-disk order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &PakEntry)> {
        self.file_table.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// The underlying file table
    #[must_use]
    pub fn file_table(&self) -> &FileTable {
        &self.file_table
    }

    /// Look up an entry by name
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&PakEntry> {
        self.file_table.get(name)
    }

    /// Number of entries in the file table
    #[must_use]
    pub fn len(&self) -> usize {
        self.file_table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_table.is_empty()
    }

    /// Read and decompress one entry, given its name or its table entry
    ///
    /// A failure here leaves the reader usable for other entries.
    ///
    /// # Errors
    /// Returns [`Error::EntryNotFound`] for an unknown name, [`IoError`] for
    /// missing volumes or out-of-range data, and [`crate::error::DecodeError`]
    /// if the payload fails to decompress.
    pub fn read<'a>(&mut self, target: impl Into<EntryRef<'a>>) -> Result<Vec<u8>> {
        let entry = match target.into() {
            EntryRef::Name(name) => self
                .file_table
                .get(name)
                .cloned()
                .ok_or_else(|| Error::EntryNotFound(name.to_string()))?,
            EntryRef::Entry(entry) => entry.clone(),
        };

        tracing::trace!(
            "Reading '{}': volume {}, offset {}, {} -> {} bytes",
            entry.name,
            entry.archive_num,
            entry.offset,
            entry.size,
            entry.real_size
        );

        let raw = self
            .volumes
            .read_at(entry.archive_num, u64::from(entry.offset), entry.size as usize)?;

        Ok(decompress_entry(raw, entry.flags, entry.real_size)?)
    }

    /// Number of split volumes opened so far
    #[must_use]
    pub fn open_volumes(&self) -> usize {
        self.volumes.open_parts()
    }

    /// Close the archive and every volume handle it opened
    pub fn close(mut self) {
        self.volumes.close_parts();
    }
}

/// An entry addressed by name or by its table record
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'a> {
    Name(&'a str),
    Entry(&'a PakEntry),
}

impl<'a> From<&'a str> for EntryRef<'a> {
    fn from(name: &'a str) -> Self {
        EntryRef::Name(name)
    }
}

impl<'a> From<&'a String> for EntryRef<'a> {
    fn from(name: &'a String) -> Self {
        EntryRef::Name(name.as_str())
    }
}

impl<'a> From<&'a PakEntry> for EntryRef<'a> {
    fn from(entry: &'a PakEntry) -> Self {
        EntryRef::Entry(entry)
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn record(name: &str, fields: [u32; 6]) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        let mut tail = &mut bytes[NAME_LENGTH..];
        for field in fields {
            tail.write_u32::<LittleEndian>(field).unwrap();
        }
        bytes
    }

    /// Header + table only, with the table placed at offset 0
    fn archive(records: &[[u8; ENTRY_SIZE]], version: u32) -> Vec<u8> {
        let table: Vec<u8> = records.iter().flatten().copied().collect();
        let compressed = lz4_flex::block::compress(&table);

        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(records.len() as u32).unwrap();
        out.extend_from_slice(&compressed);

        let header_start = out.len();
        out.write_u32::<LittleEndian>(version).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(compressed.len() as u32 + 4).unwrap();
        out.write_u16::<LittleEndian>(1).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();

        let trailer_offset = (out.len() + 8 - header_start) as u32;
        out.write_u32::<LittleEndian>(trailer_offset).unwrap();
        out.extend_from_slice(&MAGIC);
        out
    }

    #[test]
    fn test_parse_file_entry_fields() {
        let bytes = record("Public/Game/meta.lsx", [10, 20, 30, 1, 2, 0xdead_beef]);
        let entry = parse_file_entry(&bytes, 0).unwrap();
        assert_eq!(entry.name, "Public/Game/meta.lsx");
        assert_eq!(entry.offset, 10);
        assert_eq!(entry.size, 20);
        assert_eq!(entry.real_size, 30);
        assert_eq!(entry.archive_num, 1);
        assert_eq!(entry.flags, 2);
        assert_eq!(entry.checksum, 0xdead_beef);
    }

    #[test]
    fn test_parse_file_entry_invalid_utf8() {
        let mut bytes = record("ok", [0; 6]);
        bytes[0] = 0xff;
        let err = parse_file_entry(&bytes, 7).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::InvalidName { index: 7 })));
    }

    #[test]
    fn test_locate_header() {
        let data = archive(&[record("a", [0; 6])], SUPPORTED_VERSION);
        let (header, trailer_offset) = locate_header(&mut Cursor::new(&data)).unwrap();
        assert_eq!(header.version, 13);
        assert_eq!(header.file_table_offset, 0);
        assert_eq!(header.volume_count, 1);
        assert_eq!(trailer_offset, 24);
    }

    #[test]
    fn test_bad_magic() {
        let mut data = archive(&[record("a", [0; 6])], SUPPORTED_VERSION);
        let len = data.len();
        data[len - 1] = b'X';
        let err = locate_header(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::BadMagic)));
    }

    #[test]
    fn test_too_short_for_trailer() {
        let err = locate_header(&mut Cursor::new(b"LSPK".to_vec())).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::BadMagic)));
    }

    #[test]
    fn test_unsupported_version() {
        let data = archive(&[record("a", [0; 6])], 18);
        let err = locate_header(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::UnsupportedVersion(18))));
    }

    #[test]
    fn test_trailer_offset_out_of_bounds() {
        let mut data = vec![0u8; 4];
        data.write_u32::<LittleEndian>(1000).unwrap();
        data.extend_from_slice(&MAGIC);
        let err = locate_header(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::HeaderOutOfBounds {
                trailer_offset: 1000,
                file_len: 12
            })
        ));
    }

    #[test]
    fn test_file_table_order_and_duplicates() {
        let data = archive(
            &[
                record("a", [1, 0, 0, 0, 0, 0]),
                record("b", [2, 0, 0, 0, 0, 0]),
                record("c", [3, 0, 0, 0, 0, 0]),
                record("a", [4, 0, 0, 0, 0, 0]),
            ],
            SUPPORTED_VERSION,
        );
        let reader = PakReader::from_reader(Cursor::new(data), None).unwrap();

        let names: Vec<&str> = reader.entries().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(reader.entry("a").unwrap().offset, 4);
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn test_truncated_table() {
        let records = [record("a", [0; 6]), record("b", [0; 6])];
        let mut data = archive(&records, SUPPORTED_VERSION);
        // Claim one more entry than the block holds
        data[0] = 3;
        let err = PakReader::from_reader(Cursor::new(data), None).err().unwrap();
        assert!(matches!(
            err,
            Error::Format(FormatError::TruncatedTable {
                expected: 840,
                actual: 560
            })
        ));
    }

    #[test]
    fn test_entry_count_far_beyond_block() {
        let mut data = archive(&[record("only", [0; 6])], SUPPORTED_VERSION);
        data[..4].copy_from_slice(&1000u32.to_le_bytes());
        let err = PakReader::from_reader(Cursor::new(data), None).err().unwrap();
        assert!(matches!(
            err,
            Error::Format(FormatError::TruncatedTable {
                expected: 280_000,
                actual: 280
            })
        ));
    }

    #[test]
    fn test_entry_not_found() {
        let data = archive(&[record("a", [0; 6])], SUPPORTED_VERSION);
        let mut reader = PakReader::from_reader(Cursor::new(data), None).unwrap();
        let err = reader.read("missing.txt").unwrap_err();
        assert!(matches!(err, Error::EntryNotFound(name) if name == "missing.txt"));
    }
}
