//! Document node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.
//! Node identity is index identity: two NodeIds from the same document are
//! the same node exactly when they are equal.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document node is always the first node in the arena
pub const DOCUMENT_NODE: NodeId = 0;

/// Type of document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// Comment
    Comment,
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for the document node)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into string pool for name (elements) or content (text, comments)
    pub name_id: u32,
    /// Start of attributes in attribute arena (for elements)
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u16,
    /// Depth in document tree
    pub depth: u16,
}

impl Node {
    fn unlinked(kind: NodeKind, name_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Node {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            attr_start: 0,
            attr_count: 0,
            depth,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::unlinked(NodeKind::Document, 0, None, 0)
    }

    /// Create a new element node
    pub fn element(name_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::unlinked(NodeKind::Element, name_id, Some(parent), depth)
    }

    /// Create a new text node
    pub fn text(content_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::unlinked(NodeKind::Text, content_id, Some(parent), depth)
    }

    /// Create a new comment node
    pub fn comment(content_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::unlinked(NodeKind::Comment, content_id, Some(parent), depth)
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    /// Index into string pool for attribute name
    pub name_id: u32,
    /// Index into string pool for attribute value
    pub value_id: u32,
}

impl Attribute {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        Attribute { name_id, value_id }
    }
}
