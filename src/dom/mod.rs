//! DOM Module - Arena-based Document Tree
//!
//! Implements an efficient read-only tree using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - Parent, first/last child and sibling links on every node
//! - String interning for names, attribute values and text

pub mod document;
pub mod node;
pub mod strings;

pub use document::{Document, DocumentBuilder};
pub use node::{Attribute, Node, NodeId, NodeKind, DOCUMENT_NODE};
pub use strings::StringPool;

/// Trait for tree access - lets selector evaluation and traversal work
/// against any arena that exposes node links.
pub trait DocumentAccess {
    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&Node>;

    /// Get element name as string
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Get attribute value by name
    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str>;

    #[inline]
    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    #[inline]
    fn is_element(&self, id: NodeId) -> bool {
        self.node_kind(id) == Some(NodeKind::Element)
    }

    #[inline]
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    #[inline]
    fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.first_child)
    }

    #[inline]
    fn last_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.last_child)
    }

    #[inline]
    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.next_sibling)
    }

    #[inline]
    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.prev_sibling)
    }
}
