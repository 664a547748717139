//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 2015 Norbyte (`LSLib`, MIT)
//!
//! SPDX-License-Identifier: MIT
//!
//! LSPK (version 13) PAK file format reader
//!
//! The archive is located from its end: an 8-byte trailer holds the distance
//! back to a 16-byte header, which in turn points at an LZ4-compressed file
//! table of fixed 280-byte records.

mod reader;
mod types;
mod volumes;

pub use reader::{EntryRef, PakReader, ReadSource, decode_file_table, locate_header, parse_file_entry};
pub use types::*;
pub use volumes::{VolumePool, volume_path};

/// LSPK magic bytes, stored in the last four bytes of the main archive
pub const MAGIC: [u8; 4] = [b'L', b'S', b'P', b'K'];

/// The only PAK version this reader understands
pub const SUPPORTED_VERSION: u32 = 13;

/// Size of the trailer at end of file (`u32` header distance + magic)
pub const TRAILER_SIZE: u64 = 8;

/// Size of the fixed header
pub const HEADER_SIZE: usize = 16;

/// Length of the null-padded file name in a table entry
pub const NAME_LENGTH: usize = 256;

/// Size of a decompressed table entry
pub const ENTRY_SIZE: usize = 280;
