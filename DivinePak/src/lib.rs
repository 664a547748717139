//! # `DivinePak`
//!
//! A pure-Rust reader for Divinity: Original Sin 2 and Larian Studios asset packages.
//!
//! ## Supported Formats
//!
//! - **PAK archives** (LSPK version 13) - List and read entries, including
//!   entries stored in split `_N.pak` volumes
//! - **LSB** - Binary scene-graph documents, decoded into an owned node tree
//!
//! ## Quick Start
//!
//! ### Working with PAK Archives
//!
//! ```no_run
//! use divinepak::pak::PakReader;
//!
//! let mut reader = PakReader::open("Shared.pak")?;
//! println!("Found {} files", reader.len());
//!
//! // Read a specific file without extracting
//! let data = reader.read("Public/Shared/meta.lsx")?;
//! # Ok::<(), divinepak::Error>(())
//! ```
//!
//! ### Decoding Scene Graphs
//!
//! ```no_run
//! use divinepak::formats::decode_scene_graph;
//! use divinepak::pak::read_file_bytes;
//!
//! let bytes = read_file_bytes("Localization.pak", "Mods/Shared/Story/stats.lsb")?;
//! for (region, root) in decode_scene_graph(&bytes)? {
//!     println!("{region}: {} nodes", root.node_count());
//! }
//! # Ok::<(), divinepak::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `divinepak` command-line binary

pub mod compression;
pub mod error;
pub mod formats;
pub mod pak;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{DecodeError, Error, FormatError, IoError, Result};
    pub use crate::formats::lsb::{
        LsbAttribute, LsbNode, LsbOptions, decode_scene_graph, decode_scene_graph_with, read_lsb,
    };
    pub use crate::pak::{
        CompressionMethod, EntryRef, PakEntry, PakHeader, PakReader, list_pak_contents,
        read_file_bytes,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
