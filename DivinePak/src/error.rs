//! Error types for `DivinePak`
//!
//! Failures are split by what went wrong: the byte stream does not follow the
//! grammar ([`FormatError`]), the environment failed ([`IoError`]), or a
//! payload's compressed encoding is inconsistent ([`DecodeError`]).

use std::path::PathBuf;

use thiserror::Error;

/// The byte stream does not conform to the PAK or LSB grammar.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FormatError {
    // ==================== PAK Archive Errors ====================
    /// The trailer does not end with the `LSPK` signature.
    #[error("invalid PAK magic: expected LSPK")]
    BadMagic,

    /// The header carries a version this reader does not understand.
    #[error("unsupported PAK version: {0} (supported: {})", crate::pak::lspk::SUPPORTED_VERSION)]
    UnsupportedVersion(u32),

    /// The trailer points outside the file.
    #[error("PAK header out of bounds: trailer offset {trailer_offset} in a {file_len} byte file")]
    HeaderOutOfBounds {
        /// Distance from end of file to the header, as stored in the trailer.
        trailer_offset: u32,
        /// Length of the main archive file.
        file_len: u64,
    },

    /// The decompressed file table is shorter than its declared entry count needs.
    #[error("truncated file table: expected {expected} bytes, got {actual}")]
    TruncatedTable {
        /// Bytes required for the declared number of entries.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The compressed file table could not be decoded.
    #[error("corrupt file table: {0}")]
    CorruptTable(String),

    /// An entry name is not valid UTF-8.
    #[error("file table entry {index} has a name that is not valid UTF-8")]
    InvalidName {
        /// Position of the record in the file table.
        index: usize,
    },

    // ==================== LSB Format Errors ====================
    /// A node, attribute or region references a key missing from the identifier table.
    #[error("unknown identifier key: {0}")]
    UnknownIdentifier(u32),

    /// An attribute carries a type tag outside the known set.
    #[error("unknown attribute type: {0:#04x}")]
    UnknownAttributeType(u32),

    /// The buffer ended in the middle of a record.
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof {
        /// Cursor position when the read was attempted.
        offset: u64,
    },

    /// A length-prefixed string is not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string payload.
        offset: u64,
    },

    /// A region's offset lies past the end of the buffer.
    #[error("region '{region}' starts at {offset}, past the end of the data")]
    RegionOutOfBounds {
        /// Region name.
        region: String,
        /// Declared offset of the region's root node.
        offset: u32,
    },

    /// Node nesting exceeded the configured maximum depth.
    #[error("node nesting too deep: {depth}")]
    NodeTooDeep {
        /// Depth at which decoding stopped.
        depth: usize,
    },
}

/// The environment failed while reading an archive.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying read or seek failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A split-archive volume file could not be opened.
    #[error("archive volume {volume} not found: {}", path.display())]
    MissingVolume {
        /// The volume number (1+ for split parts).
        volume: u32,
        /// Where the volume was expected to be.
        path: PathBuf,
    },

    /// Fewer bytes were available than the entry declares.
    #[error("truncated read at offset {offset}: expected {expected} bytes, {available} available")]
    Truncated {
        /// Offset of the read within its volume.
        offset: u64,
        /// Bytes requested.
        expected: usize,
        /// Bytes actually available.
        available: usize,
    },
}

/// An entry's compressed payload is invalid or inconsistent with its declared sizes.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Zlib inflate failed.
    #[error("Zlib decompression failed: {0}")]
    Zlib(String),

    /// LZ4 block decode failed or produced the wrong length.
    #[error("LZ4 decompression failed: {0}")]
    Lz4(String),

    /// Decompressed length differs from the entry's real size.
    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// The entry's declared real size.
        expected: usize,
        /// Bytes actually produced.
        actual: usize,
    },

    /// The low nibble of the entry flags selects no known method.
    #[error("unknown compression method in flags {0:#x}")]
    UnknownCompression(u32),
}

/// The error type for `DivinePak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// The data does not follow the expected grammar.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Reading from disk failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// An entry payload failed to decompress.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The requested name is not in the archive's file table.
    #[error("file not found in PAK: {0}")]
    EntryNotFound(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(IoError::Io(err))
    }
}

/// A specialized Result type for `DivinePak` operations.
pub type Result<T> = std::result::Result<T, Error>;
