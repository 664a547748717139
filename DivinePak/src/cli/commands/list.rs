//! CLI command for listing PAK contents

use std::path::Path;

use crate::cli::format::{format_size, matches_glob};
use crate::pak::{PakEntry, PakReader};

fn entry_matches(pattern: &str, name: &str) -> bool {
    let filename = name.rsplit('/').next().unwrap_or(name);
    matches_glob(pattern, filename) || matches_glob(pattern, name)
}

/// List the archive's entries, optionally filtered
///
/// # Errors
/// Returns an error if the archive cannot be opened.
pub fn execute(source: &Path, detailed: bool, filter: Option<&str>, count: bool) -> anyhow::Result<()> {
    let reader = PakReader::open(source)?;

    let filtered: Vec<(&str, &PakEntry)> = reader
        .entries()
        .filter(|(name, _)| filter.is_none_or(|pattern| entry_matches(pattern, name)))
        .collect();

    if count {
        println!("{}", filtered.len());
        return Ok(());
    }

    if !detailed {
        for (name, _) in &filtered {
            println!("{name}");
        }
        return Ok(());
    }

    // Print header
    println!("{:>10}  {:>10}  {:>11}  {:>6}  PATH", "SIZE", "STORED", "COMPRESSION", "VOLUME");

    for (name, entry) in &filtered {
        let compression = entry
            .compression()
            .map_or("unknown", |method| method.as_str());

        println!(
            "{:>10}  {:>10}  {:>11}  {:>6}  {}",
            format_size(u64::from(entry.real_size)),
            format_size(u64::from(entry.size)),
            compression,
            entry.archive_num,
            name
        );
    }

    // Print summary
    let total_real: u64 = filtered.iter().map(|(_, e)| u64::from(e.real_size)).sum();
    let total_stored: u64 = filtered.iter().map(|(_, e)| u64::from(e.size)).sum();

    println!();
    println!(
        "{} files, {} total ({} stored)",
        filtered.len(),
        format_size(total_real),
        format_size(total_stored)
    );

    Ok(())
}
