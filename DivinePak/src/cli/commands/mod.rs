//! Subcommand definitions for the CLI

use clap::Subcommand;
use std::path::PathBuf;

pub mod details;
pub mod extract;
pub mod grep;
pub mod list;

mod execute;

#[derive(Subcommand)]
pub enum Commands {
    /// Print every file contained in the archive, in catalog order
    List {
        /// Source PAK file
        archive: PathBuf,

        /// Only list files matching glob pattern (e.g., "*.lsb")
        #[arg(long)]
        filter: Option<String>,

        /// Only print the number of matching files
        #[arg(short, long)]
        count: bool,

        /// Show stored size, real size and compression for each file
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract one file from the archive, writing it to stdout
    Extract {
        /// Source PAK file
        archive: PathBuf,

        /// Internal path of the file to extract
        path: String,

        /// Decode the file as an LSB scene graph and write it as JSON
        #[arg(long)]
        lsb_to_json: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print archive header details, or details of one file
    Details {
        /// Source PAK file
        archive: PathBuf,

        /// Internal path of a file within the archive
        path: Option<String>,
    },

    /// Print every file whose contents contain the given text
    Grep {
        /// Source PAK file
        archive: PathBuf,

        /// Literal text to search for
        pattern: String,
    },
}
