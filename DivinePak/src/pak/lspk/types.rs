//! Types for LSPK PAK file handling
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 2015 Norbyte (`LSLib`, MIT)
//!
//! SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::DecodeError;

/// Compression method used for a file in the PAK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    None,
    Zlib,
    Lz4,
}

impl CompressionMethod {
    /// Parse compression method from the low nibble of the entry flags
    ///
    /// # Errors
    /// Returns [`DecodeError::UnknownCompression`] for any nibble other than 0, 1 or 2.
    pub fn from_flags(flags: u32) -> Result<Self, DecodeError> {
        match flags & 0x0F {
            0 => Ok(CompressionMethod::None),
            1 => Ok(CompressionMethod::Zlib),
            2 => Ok(CompressionMethod::Lz4),
            _ => Err(DecodeError::UnknownCompression(flags)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMethod::None => "none",
            CompressionMethod::Zlib => "zlib",
            CompressionMethod::Lz4 => "lz4",
        }
    }
}

/// Header of an LSPK PAK file, found `trailer_offset` bytes before end of file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PakHeader {
    /// Version number (always [`SUPPORTED_VERSION`](super::SUPPORTED_VERSION) once parsed)
    pub version: u32,
    /// Absolute offset of the file table in the main archive
    pub file_table_offset: u32,
    /// Size of the file table including its 4-byte entry count
    pub file_table_size: u32,
    /// Number of volumes the archive is split across
    pub volume_count: u16,
    /// Unused
    pub reserved: u16,
}

/// Entry in the file table describing a file in the PAK
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PakEntry {
    /// Path of the file within the archive
    pub name: String,
    /// Offset of the stored data from the start of its volume
    pub offset: u32,
    /// Size of the stored (possibly compressed) data
    pub size: u32,
    /// Size of the decompressed data
    pub real_size: u32,
    /// Volume number (0 = main .pak, 1+ = _1.pak, _2.pak, etc.)
    pub archive_num: u32,
    /// Raw flags; the low nibble selects the compression method
    pub flags: u32,
    /// Carried as stored. Never validated: the algorithm is undocumented.
    pub checksum: u32,
}

impl PakEntry {
    /// Compression method selected by this entry's flags
    ///
    /// # Errors
    /// Returns [`DecodeError::UnknownCompression`] if the flags select no known method.
    pub fn compression(&self) -> Result<CompressionMethod, DecodeError> {
        CompressionMethod::from_flags(self.flags)
    }

    #[must_use]
    pub fn is_zlib(&self) -> bool {
        self.flags & 0x0F == 1
    }

    #[must_use]
    pub fn is_lz4_block(&self) -> bool {
        self.flags & 0x0F == 2
    }
}

/// Catalog of entries keyed by name, in on-disk order
///
/// Inserting a name twice replaces the earlier metadata but keeps the
/// position where the name was first seen.
pub type FileTable = IndexMap<String, PakEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_from_flags() {
        assert_eq!(CompressionMethod::from_flags(0).unwrap(), CompressionMethod::None);
        assert_eq!(CompressionMethod::from_flags(1).unwrap(), CompressionMethod::Zlib);
        assert_eq!(CompressionMethod::from_flags(0x22).unwrap(), CompressionMethod::Lz4);
        assert!(matches!(
            CompressionMethod::from_flags(0x0F),
            Err(DecodeError::UnknownCompression(0x0F))
        ));
    }

    #[test]
    fn test_entry_predicates() {
        let entry = PakEntry {
            name: "a".to_string(),
            offset: 0,
            size: 0,
            real_size: 0,
            archive_num: 0,
            flags: 0x12,
            checksum: 0,
        };
        assert!(entry.is_lz4_block());
        assert!(!entry.is_zlib());
        assert_eq!(entry.compression().unwrap().as_str(), "lz4");
    }
}
