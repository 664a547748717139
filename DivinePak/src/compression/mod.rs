//! Compression utilities
//!
//! Both PAK entry payloads and the PAK file table are compressed without any
//! length prefix, so every decoder here is driven by a caller-supplied size.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::DecodeError;
use crate::pak::lspk::CompressionMethod;

/// Upper bound on what one LZ4 block byte can expand to
const LZ4_MAX_RATIO: usize = 255;

/// Upper bound on what one deflate byte can expand to
const ZLIB_MAX_RATIO: usize = 1032;

/// Decompress an LZ4 block into a buffer of at most `expected_size` bytes
///
/// The returned vector is truncated to the number of bytes the block actually
/// produced, which may be less than `expected_size`. Callers decide whether
/// a short result is an error. The output buffer is never larger than the
/// most the block could possibly expand to.
///
/// # Errors
/// Returns [`DecodeError::Lz4`] if the stream is corrupt or would overrun
/// `expected_size`.
pub fn decompress_lz4_block(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>, DecodeError> {
    if compressed.is_empty() && expected_size == 0 {
        return Ok(Vec::new());
    }
    let bound = compressed.len().saturating_mul(LZ4_MAX_RATIO).saturating_add(LZ4_MAX_RATIO);

    let mut decompressed = vec![0u8; expected_size.min(bound)];
    let written = lz4_flex::block::decompress_into(compressed, &mut decompressed)
        .map_err(|e| DecodeError::Lz4(e.to_string()))?;
    decompressed.truncate(written);

    Ok(decompressed)
}

/// Inflate a zlib stream, stopping one byte past `expected_size`
///
/// A stream longer than `expected_size` comes back with `expected_size + 1`
/// bytes so the caller can tell it overran without inflating the rest.
///
/// # Errors
/// Returns [`DecodeError::Zlib`] if the stream is not valid zlib.
pub fn decompress_zlib(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>, DecodeError> {
    let limit = (expected_size as u64).saturating_add(1);
    let mut decoder = ZlibDecoder::new(compressed).take(limit);
    let mut decompressed =
        Vec::with_capacity(expected_size.min(compressed.len().saturating_mul(ZLIB_MAX_RATIO)));

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::Zlib(e.to_string()))?;

    Ok(decompressed)
}

/// Turn an entry's on-disk bytes into its logical payload
///
/// Uncompressed payloads are returned unchanged. Compressed payloads must
/// decode to exactly `real_size` bytes.
///
/// # Errors
/// Returns [`DecodeError::UnknownCompression`] for an unrecognised method,
/// [`DecodeError::Zlib`] / [`DecodeError::Lz4`] for corrupt streams, and
/// [`DecodeError::SizeMismatch`] when a zlib stream inflates to the wrong length.
pub fn decompress_entry(raw: Vec<u8>, flags: u32, real_size: u32) -> Result<Vec<u8>, DecodeError> {
    let expected = real_size as usize;

    match CompressionMethod::from_flags(flags)? {
        CompressionMethod::None => Ok(raw),

        CompressionMethod::Zlib => {
            let data = decompress_zlib(&raw, expected)?;
            if data.len() != expected {
                return Err(DecodeError::SizeMismatch {
                    expected,
                    actual: data.len(),
                });
            }
            Ok(data)
        }

        CompressionMethod::Lz4 => {
            let data = decompress_lz4_block(&raw, expected)?;
            if data.len() != expected {
                return Err(DecodeError::Lz4(format!(
                    "block produced {} bytes, expected {expected}",
                    data.len()
                )));
            }
            Ok(data)
        }
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_uncompressed_passthrough() {
        let data = decompress_entry(b"raw bytes".to_vec(), 0, 0).unwrap();
        assert_eq!(data, b"raw bytes");
    }

    #[test]
    fn test_zlib_entry() {
        let payload = b"zlib zlib zlib zlib zlib".repeat(8);
        let data = decompress_entry(zlib(&payload), 1, payload.len() as u32).unwrap();
        assert_eq!(data, payload);
    }

    #[test]
    fn test_zlib_size_mismatch() {
        let payload = b"twelve bytes";
        let err = decompress_entry(zlib(payload), 1, 20).unwrap_err();
        assert!(matches!(err, DecodeError::SizeMismatch { expected: 20, actual: 12 }));
    }

    #[test]
    fn test_zlib_overrun_stops_early() {
        let payload = vec![0u8; 4 * 1024 * 1024];
        let compressed = zlib(&payload);

        let inflated = decompress_zlib(&compressed, 5).unwrap();
        assert_eq!(inflated.len(), 6);

        let err = decompress_entry(compressed, 1, 5).unwrap_err();
        assert!(matches!(err, DecodeError::SizeMismatch { expected: 5, actual: 6 }));
    }

    #[test]
    fn test_lz4_block_short_output() {
        let payload = b"only one short record".to_vec();
        let compressed = lz4_flex::block::compress(&payload);

        // Far more than the block can ever produce
        let data = decompress_lz4_block(&compressed, 1_000_000).unwrap();
        assert_eq!(data, payload);
    }

    #[test]
    fn test_zlib_garbage() {
        let err = decompress_entry(vec![0xde, 0xad, 0xbe, 0xef], 1, 4).unwrap_err();
        assert!(matches!(err, DecodeError::Zlib(_)));
    }

    #[test]
    fn test_lz4_entry() {
        let payload = b"lz4 block lz4 block lz4 block".repeat(4);
        let compressed = lz4_flex::block::compress(&payload);
        let data = decompress_entry(compressed, 2, payload.len() as u32).unwrap();
        assert_eq!(data, payload);
    }

    #[test]
    fn test_lz4_wrong_real_size() {
        let payload = b"abcdefghijklmnop".repeat(4);
        let compressed = lz4_flex::block::compress(&payload);

        let too_small = decompress_entry(compressed.clone(), 2, 10).unwrap_err();
        assert!(matches!(too_small, DecodeError::Lz4(_)));

        let too_large = decompress_entry(compressed, 2, 1000).unwrap_err();
        assert!(matches!(too_large, DecodeError::Lz4(_)));
    }

    #[test]
    fn test_upper_flag_bits_ignored() {
        let payload = b"flags".to_vec();
        let compressed = lz4_flex::block::compress(&payload);
        let data = decompress_entry(compressed, 0x42, 5).unwrap();
        assert_eq!(data, payload);
    }

    #[test]
    fn test_unknown_compression() {
        let err = decompress_entry(vec![1, 2, 3], 0x07, 3).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownCompression(0x07)));
    }
}
