//! CLI command for extracting a single file from a PAK

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::formats::decode_scene_graph;
use crate::pak::PakReader;

/// Write one decoded entry to stdout or `output`
///
/// # Errors
/// Returns an error if the archive cannot be opened, the entry cannot be
/// read or decoded, or the output cannot be written.
pub fn execute(source: &Path, path: &str, lsb_to_json: bool, output: Option<&Path>) -> anyhow::Result<()> {
    let mut reader = PakReader::open(source)?;
    let contents = reader.read(path)?;
    reader.close();

    let mut writer: Box<dyn Write> = match output {
        Some(out) => Box::new(BufWriter::new(File::create(out)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if lsb_to_json {
        let regions = decode_scene_graph(&contents)?;
        serde_json::to_writer_pretty(&mut writer, &regions)?;
        writeln!(writer)?;
    } else {
        writer.write_all(&contents)?;
    }

    writer.flush()?;
    Ok(())
}
