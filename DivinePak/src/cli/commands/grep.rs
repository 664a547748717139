//! CLI command for searching file contents inside a PAK

use std::path::Path;

use crate::pak::PakReader;

/// Whether `needle` occurs anywhere in `haystack`
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Print every entry whose decoded contents contain `pattern`
///
/// # Errors
/// Returns an error if the archive cannot be opened or any entry fails to read.
pub fn execute(source: &Path, pattern: &str) -> anyhow::Result<()> {
    let mut reader = PakReader::open(source)?;

    let names: Vec<String> = reader.entries().map(|(name, _)| name.to_string()).collect();
    for name in names {
        let contents = reader.read(name.as_str())?;
        if contains_bytes(&contents, pattern.as_bytes()) {
            println!("{name}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(b"hello world", b"lo w"));
        assert!(contains_bytes(b"abc", b""));
        assert!(!contains_bytes(b"abc", b"abcd"));
        assert!(!contains_bytes(b"hello", b"Hello"));
    }
}
