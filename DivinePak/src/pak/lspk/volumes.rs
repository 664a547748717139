//! Split-archive volume handles
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{IoError, Result};

/// Trait for types that can Read and Seek
pub trait ReadSource: Read + Seek {}
impl<T: Read + Seek> ReadSource for T {}

/// Path of split volume `volume` for the archive at `main_path`
///
/// `Foo.pak` in `dir` has its second volume at `dir/Foo_2.pak`. The stem is
/// everything before the first `.` of the file name, so `Foo.bar.pak`
/// becomes `Foo_2.pak` as well.
#[must_use]
pub fn volume_path(main_path: &Path, volume: u32) -> PathBuf {
    let dir = main_path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = main_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    dir.join(format!("{stem}_{volume}.pak"))
}

/// Owner of every open handle belonging to one archive
///
/// Volume 0 is the source the archive was opened with. Higher volumes are
/// opened on first use and kept until the pool is closed or dropped.
pub struct VolumePool<R: Read + Seek> {
    main: R,
    /// Path of the main archive; `None` for in-memory sources
    main_path: Option<PathBuf>,
    parts: HashMap<u32, BufReader<File>>,
    lengths: HashMap<u32, u64>,
}

impl<R: Read + Seek> VolumePool<R> {
    #[must_use]
    pub fn new(main: R, main_path: Option<&Path>) -> Self {
        Self {
            main,
            main_path: main_path.map(Path::to_path_buf),
            parts: HashMap::new(),
            lengths: HashMap::new(),
        }
    }

    /// Get or open the handle for `volume`
    ///
    /// # Errors
    /// Returns [`IoError::MissingVolume`] if the volume file cannot be opened.
    pub fn resolve(&mut self, volume: u32) -> Result<&mut dyn ReadSource> {
        if volume == 0 {
            return Ok(&mut self.main);
        }

        let part = match self.parts.entry(volume) {
            Entry::Occupied(open) => open.into_mut(),
            Entry::Vacant(slot) => {
                let path = self
                    .main_path
                    .as_deref()
                    .map(|p| volume_path(p, volume))
                    .unwrap_or_default();

                let file = File::open(&path).map_err(|e| {
                    tracing::debug!("Cannot open volume {volume} at {}: {e}", path.display());
                    IoError::MissingVolume {
                        volume,
                        path: path.clone(),
                    }
                })?;

                tracing::trace!("Opened volume {volume}: {}", path.display());
                slot.insert(BufReader::new(file))
            }
        };

        Ok(part)
    }

    /// Byte length of `volume`, cached after the first query
    ///
    /// # Errors
    /// Returns an error if the volume cannot be opened or seeked.
    pub fn volume_len(&mut self, volume: u32) -> Result<u64> {
        if let Some(&len) = self.lengths.get(&volume) {
            return Ok(len);
        }

        let len = self.resolve(volume)?.seek(SeekFrom::End(0))?;
        self.lengths.insert(volume, len);
        Ok(len)
    }

    /// Read exactly `size` bytes at `offset` in `volume`
    ///
    /// # Errors
    /// Returns [`IoError::Truncated`] if the range does not fit inside the
    /// volume, or [`IoError::MissingVolume`] if the volume cannot be opened.
    pub fn read_at(&mut self, volume: u32, offset: u64, size: usize) -> Result<Vec<u8>> {
        let len = self.volume_len(volume)?;
        let available = len.saturating_sub(offset);
        let truncated = |available: u64| IoError::Truncated {
            offset,
            expected: size,
            available: usize::try_from(available).unwrap_or(usize::MAX),
        };

        if size as u64 > available {
            return Err(truncated(available).into());
        }

        let source = self.resolve(volume)?;
        source.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; size];
        source.read_exact(&mut buffer).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                truncated(available).into()
            } else {
                crate::Error::from(e)
            }
        })?;

        Ok(buffer)
    }

    /// Number of split volumes opened so far
    #[must_use]
    pub fn open_parts(&self) -> usize {
        self.parts.len()
    }

    /// Close every split volume handle
    ///
    /// The main handle stays owned by the pool until it is dropped.
    pub fn close_parts(&mut self) {
        if !self.parts.is_empty() {
            tracing::trace!("Closing {} volume handle(s)", self.parts.len());
        }
        self.parts.clear();
        self.lengths.retain(|&volume, _| volume == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_volume_path_naming() {
        let path = volume_path(Path::new("/games/dos2/Data/Foo.pak"), 2);
        assert_eq!(path, PathBuf::from("/games/dos2/Data/Foo_2.pak"));
    }

    #[test]
    fn test_volume_path_uses_first_dot() {
        let path = volume_path(Path::new("data/Textures.v2.pak"), 1);
        assert_eq!(path, PathBuf::from("data/Textures_1.pak"));
    }

    #[test]
    fn test_volume_path_bare_file_name() {
        assert_eq!(volume_path(Path::new("Foo.pak"), 3), PathBuf::from("Foo_3.pak"));
    }

    #[test]
    fn test_volume_zero_is_main() {
        let mut pool = VolumePool::new(Cursor::new(b"0123456789".to_vec()), None);
        assert_eq!(pool.open_parts(), 0);
        assert_eq!(pool.read_at(0, 2, 3).unwrap(), b"234");
        assert_eq!(pool.volume_len(0).unwrap(), 10);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut pool = VolumePool::new(Cursor::new(b"0123456789".to_vec()), None);
        let err = pool.read_at(0, 8, 5).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Io(IoError::Truncated {
                offset: 8,
                expected: 5,
                available: 2
            })
        ));
    }

    #[test]
    fn test_in_memory_pool_has_no_parts() {
        let mut pool = VolumePool::new(Cursor::new(Vec::new()), None);
        let err = pool.resolve(1).err().unwrap();
        assert!(matches!(
            err,
            crate::Error::Io(IoError::MissingVolume { volume: 1, .. })
        ));
        assert_eq!(pool.open_parts(), 0);
    }
}
