//! Query Module - Selection chains over a document
//!
//! - selection: the `Selection` handle and its traversal operations
//! - axes: per-node traversals
//! - matcher: selector text, compiled selector or node set conditions
//! - dedup: first-occurrence merging of per-node batches

pub(crate) mod axes;
pub mod dedup;
pub mod matcher;
pub mod selection;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dedup::NodeMerger;
pub use matcher::Matcher;
pub use selection::Selection;
