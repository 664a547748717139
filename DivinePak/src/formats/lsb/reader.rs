//! LSB file reading and parsing
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 2015 Norbyte (`LSLib`, MIT)
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;

use super::document::{AttributeType, LsbAttribute, LsbHeader, LsbNode};
use crate::error::FormatError;

/// Identifier key to name, built once per decode
type IdentifierTable = HashMap<u32, String>;

/// Decoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbOptions {
    /// Deepest node nesting accepted before decoding fails
    pub max_depth: usize,
}

impl LsbOptions {
    #[must_use]
    pub fn new() -> Self {
        Self { max_depth: 1024 }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for LsbOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an LSB file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or has an invalid format.
pub fn read_lsb<P: AsRef<Path>>(path: P) -> crate::Result<IndexMap<String, LsbNode>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    decode_scene_graph(&buffer)
}

/// Decode an LSB buffer into its regions, keyed by region name
///
/// # Errors
/// Returns a [`FormatError`] on any short read, unknown identifier key,
/// unknown attribute type or invalid string. Nothing is returned on failure.
pub fn decode_scene_graph(data: &[u8]) -> crate::Result<IndexMap<String, LsbNode>> {
    decode_scene_graph_with(data, &LsbOptions::default())
}

/// [`decode_scene_graph`] with explicit options
///
/// # Errors
/// See [`decode_scene_graph`]; additionally fails with
/// [`FormatError::NodeTooDeep`] past `options.max_depth`.
pub fn decode_scene_graph_with(data: &[u8], options: &LsbOptions) -> crate::Result<IndexMap<String, LsbNode>> {
    let mut reader = LsbCursor::new(data);

    let header = read_header(&mut reader)?;
    tracing::debug!(
        "LSB header: magic {:#010x}, length {}, version {}.{}.{}.{}",
        header.magic,
        header.length,
        header.version_major,
        header.version_minor,
        header.version_build,
        header.version_revision
    );

    let identifiers = read_identifiers(&mut reader)?;
    let regions = read_regions(&mut reader, &identifiers)?;
    tracing::debug!("LSB: {} identifier(s), {} region(s)", identifiers.len(), regions.len());

    let mut decoded = IndexMap::with_capacity(regions.len());
    for (name, offset) in regions {
        if u64::from(offset) >= data.len() as u64 {
            return Err(FormatError::RegionOutOfBounds { region: name, offset }.into());
        }
        reader.seek(offset);

        let root = read_node(&mut reader, &identifiers, *options, 0)?;
        decoded.insert(name, root);
    }

    Ok(decoded)
}

/// Decode only the fixed 40-byte header of an LSB buffer
///
/// # Errors
/// Returns [`FormatError::UnexpectedEof`] if the buffer is shorter than the header.
pub fn decode_header(data: &[u8]) -> crate::Result<LsbHeader> {
    Ok(read_header(&mut LsbCursor::new(data))?)
}

fn read_header(reader: &mut LsbCursor) -> Result<LsbHeader, FormatError> {
    Ok(LsbHeader {
        magic: reader.read_u32()?,
        length: reader.read_u32()?,
        endianness: reader.read_u32()?,
        reserved: reader.read_u32()?,
        created_timestamp: reader.read_u64()?,
        version_major: reader.read_u32()?,
        version_minor: reader.read_u32()?,
        version_build: reader.read_u32()?,
        version_revision: reader.read_u32()?,
    })
}

fn read_identifiers(reader: &mut LsbCursor) -> Result<IdentifierTable, FormatError> {
    let count = reader.read_u32()?;
    let mut identifiers = IdentifierTable::new();

    for _ in 0..count {
        let length = reader.read_u32()? as usize;
        let offset = reader.position();
        let bytes = reader.read_bytes(length)?;
        let name = std::str::from_utf8(bytes)
            .map_err(|_| FormatError::InvalidUtf8 { offset })?
            .to_string();
        let key = reader.read_u32()?;

        identifiers.insert(key, name);
    }

    Ok(identifiers)
}

fn read_regions(
    reader: &mut LsbCursor,
    identifiers: &IdentifierTable,
) -> Result<IndexMap<String, u32>, FormatError> {
    let count = reader.read_u32()?;
    let mut regions = IndexMap::new();

    for _ in 0..count {
        let key = reader.read_u32()?;
        let offset = reader.read_u32()?;
        regions.insert(resolve(identifiers, key)?.to_string(), offset);
    }

    Ok(regions)
}

fn resolve(identifiers: &IdentifierTable, key: u32) -> Result<&str, FormatError> {
    identifiers
        .get(&key)
        .map(String::as_str)
        .ok_or(FormatError::UnknownIdentifier(key))
}

fn read_node(
    reader: &mut LsbCursor,
    identifiers: &IdentifierTable,
    options: LsbOptions,
    depth: usize,
) -> Result<LsbNode, FormatError> {
    if depth >= options.max_depth {
        return Err(FormatError::NodeTooDeep { depth });
    }

    let key = reader.read_u32()?;
    let attribute_count = reader.read_u32()?;
    let child_count = reader.read_u32()?;

    let mut node = LsbNode::new(resolve(identifiers, key)?);

    for _ in 0..attribute_count {
        let name_key = reader.read_u32()?;
        let type_tag = reader.read_u32()?;
        let name = resolve(identifiers, name_key)?;
        let attr_type = AttributeType::try_from(type_tag)?;
        tracing::trace!("Attribute '{name}': {}", attr_type.name());
        let value = read_attribute(reader, attr_type)?;

        node.attributes.insert(name.to_string(), value);
    }

    for _ in 0..child_count {
        node.children.push(read_node(reader, identifiers, options, depth + 1)?);
    }

    Ok(node)
}

fn read_attribute(reader: &mut LsbCursor, attr_type: AttributeType) -> Result<LsbAttribute, FormatError> {
    match attr_type {
        AttributeType::UInt32 => Ok(LsbAttribute::UInt(reader.read_u32()?)),
        AttributeType::Bool => Ok(LsbAttribute::Bool(reader.read_u8()? != 0)),
        AttributeType::FixedString | AttributeType::LsString => {
            Ok(LsbAttribute::String(reader.read_prefixed_string()?))
        }
        AttributeType::TranslatedString => {
            let value = reader.read_prefixed_string()?;
            let handle = reader.read_prefixed_bytes_lossy()?;
            Ok(LsbAttribute::TranslatedString { value, handle })
        }
    }
}

/// Bounds-checked little-endian reads over an LSB buffer
struct LsbCursor<'a> {
    data: &'a [u8],
    cursor: Cursor<&'a [u8]>,
}

impl<'a> LsbCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: Cursor::new(data),
        }
    }

    fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn seek(&mut self, offset: u32) {
        self.cursor.set_position(u64::from(offset));
    }

    fn eof(&self) -> FormatError {
        FormatError::UnexpectedEof {
            offset: self.position(),
        }
    }

    fn read_u8(&mut self) -> Result<u8, FormatError> {
        let offset = self.position();
        self.cursor
            .read_u8()
            .map_err(|_| FormatError::UnexpectedEof { offset })
    }

    fn read_u32(&mut self) -> Result<u32, FormatError> {
        let offset = self.position();
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| FormatError::UnexpectedEof { offset })
    }

    fn read_u64(&mut self) -> Result<u64, FormatError> {
        let offset = self.position();
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| FormatError::UnexpectedEof { offset })
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let data = self.data;
        let start = usize::try_from(self.position()).map_err(|_| self.eof())?;
        let end = start.checked_add(len).filter(|&end| end <= data.len()).ok_or_else(|| self.eof())?;

        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    /// `u32` length followed by that many UTF-8 bytes, trailing NULs trimmed
    fn read_prefixed_string(&mut self) -> Result<String, FormatError> {
        let length = self.read_u32()? as usize;
        let offset = self.position();
        let bytes = self.read_bytes(length)?;

        let text = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { offset })?;
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// `u32` length followed by that many opaque bytes; invalid UTF-8 is replaced
    fn read_prefixed_bytes_lossy(&mut self) -> Result<String, FormatError> {
        let length = self.read_u32()? as usize;
        let bytes = self.read_bytes(length)?;

        Ok(String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string())
    }
}
