//! File format handlers for Larian Studios formats

pub mod lsb;

// Re-export main document types
pub use lsb::{AttributeType, LsbAttribute, LsbHeader, LsbNode, LsbOptions};
pub use lsb::{decode_header, decode_scene_graph, decode_scene_graph_with, read_lsb};
