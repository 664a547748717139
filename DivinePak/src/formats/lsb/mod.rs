//! LSB (Larian binary scene graph) format module
//!
//! An LSB buffer is a 40-byte header, an identifier table mapping numeric
//! keys to names, and a region table pointing at the root node of each
//! named tree. Nodes are decoded recursively, driven entirely by the
//! attribute and child counts stored in the stream.

mod document;
mod reader;

// Public API
pub use document::{AttributeType, LsbAttribute, LsbHeader, LsbNode};
pub use reader::{LsbOptions, decode_header, decode_scene_graph, decode_scene_graph_with, read_lsb};
