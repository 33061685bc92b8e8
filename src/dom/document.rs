//! Document - Arena-based tree representation
//!
//! Efficient storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal
//! - String interning for names and content
//!
//! Documents are assembled with [`DocumentBuilder`] and are immutable
//! afterwards, so they can be shared across threads behind an `Arc`.

use super::node::{Attribute, Node, NodeId, NodeKind, DOCUMENT_NODE};
use super::strings::StringPool;
use super::DocumentAccess;

/// A document stored in arena format
#[derive(Debug)]
pub struct Document {
    /// Arena of nodes
    nodes: Vec<Node>,
    /// Arena of attributes
    attributes: Vec<Attribute>,
    /// Interned strings
    strings: StringPool,
    /// Root element node ID (not document node)
    root_element: Option<NodeId>,
}

impl Document {
    fn empty() -> Self {
        Document {
            nodes: vec![Node::document()],
            attributes: Vec::with_capacity(64),
            strings: StringPool::new(),
            root_element: None,
        }
    }

    /// Get the document node ID (always 0)
    #[inline]
    pub fn document_node_id(&self) -> NodeId {
        DOCUMENT_NODE
    }

    /// Get root element ID
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Get element name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_element() {
            self.strings.get_str(node.name_id)
        } else {
            None
        }
    }

    /// Get content of a text or comment node
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::Comment => self.strings.get_str(node.name_id),
            _ => None,
        }
    }

    /// Get attributes for an element
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.get_node(id)
            .and_then(|node| {
                let start = node.attr_start as usize;
                self.attributes.get(start..start + node.attr_count as usize)
            })
            .unwrap_or(&[])
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| self.strings.get_str(attr.name_id) == Some(name))
            .and_then(|attr| self.strings.get_str(attr.value_id))
    }

    /// Get all attribute names and values for a node
    pub fn get_attribute_values(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attributes(id)
            .iter()
            .filter_map(|attr| {
                let name = self.strings.get_str(attr.name_id)?;
                let value = self.strings.get_str(attr.value_id)?;
                Some((name, value))
            })
            .collect()
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter {
            doc: self,
            stack: Vec::new(),
        };
        iter.push_children(id);
        iter
    }

    /// Find the first element (document order) whose `id` attribute equals `value`
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(DOCUMENT_NODE)
            .find(|&id| self.get_attribute(id, "id") == Some(value))
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the string pool for direct access
    pub fn strings(&self) -> &StringPool {
        &self.strings
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first, document order)
pub struct DescendantIter<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl DescendantIter<'_> {
    /// Push children in reverse order so the first child is visited first
    fn push_children(&mut self, id: NodeId) {
        let mut child_id = self.doc.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child_id {
            self.stack.push(cid);
            child_id = self.doc.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}

impl DocumentAccess for Document {
    fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        Document::node_name(self, id)
    }

    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        Document::get_attribute(self, id, name)
    }
}

/// Incremental document construction
///
/// Nodes are appended in document order; `open` pushes an element onto the
/// insertion stack and `close` pops it. Unclosed elements are closed by
/// `finish`.
///
/// ```
/// use rustyquery::dom::DocumentBuilder;
///
/// let mut builder = DocumentBuilder::new();
/// builder.open("ul", &[("id", "menu")]);
/// builder.leaf("li", &[("class", "item")]);
/// builder.text("\n");
/// builder.leaf("li", &[("class", "item")]);
/// builder.close();
/// let doc = builder.finish();
/// assert_eq!(doc.node_count(), 5);
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    doc: Document,
    stack: Vec<NodeId>,
}

impl DocumentBuilder {
    /// Create a builder holding only the document node
    pub fn new() -> Self {
        DocumentBuilder {
            doc: Document::empty(),
            stack: vec![DOCUMENT_NODE],
        }
    }

    #[inline]
    fn current_parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(DOCUMENT_NODE)
    }

    #[inline]
    fn current_depth(&self) -> u16 {
        self.stack.len().min(u16::MAX as usize) as u16
    }

    /// Append an element and make it the insertion point for following nodes
    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let parent_id = self.current_parent();
        let name_id = self.doc.strings.intern(name);
        let mut node = Node::element(name_id, parent_id, self.current_depth());

        node.attr_start = self.doc.attributes.len() as u32;
        node.attr_count = attributes.len().min(u16::MAX as usize) as u16;
        for (attr_name, attr_value) in attributes.iter().take(node.attr_count as usize) {
            let name_id = self.doc.strings.intern(attr_name);
            let value_id = self.doc.strings.intern(attr_value);
            self.doc.attributes.push(Attribute::new(name_id, value_id));
        }

        let node_id = self.push(node, parent_id);
        if self.doc.root_element.is_none() && parent_id == DOCUMENT_NODE {
            self.doc.root_element = Some(node_id);
        }
        self.stack.push(node_id);
        node_id
    }

    /// Append an element with no children
    pub fn leaf(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node_id = self.open(name, attributes);
        self.close();
        node_id
    }

    /// Close the innermost open element, returning it
    ///
    /// Returns None when no element is open.
    pub fn close(&mut self) -> Option<NodeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Append a text node at the insertion point
    pub fn text(&mut self, content: &str) -> NodeId {
        let parent_id = self.current_parent();
        let content_id = self.doc.strings.intern(content);
        let node = Node::text(content_id, parent_id, self.current_depth());
        self.push(node, parent_id)
    }

    /// Append a comment node at the insertion point
    pub fn comment(&mut self, content: &str) -> NodeId {
        let parent_id = self.current_parent();
        let content_id = self.doc.strings.intern(content);
        let node = Node::comment(content_id, parent_id, self.current_depth());
        self.push(node, parent_id)
    }

    /// Consume the builder and return the finished document
    pub fn finish(self) -> Document {
        self.doc
    }

    fn push(&mut self, node: Node, parent_id: NodeId) -> NodeId {
        let node_id = self.doc.nodes.len() as NodeId;
        self.doc.nodes.push(node);
        self.link_child(parent_id, node_id);
        node_id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let nodes = &mut self.doc.nodes;
        match nodes[parent_id as usize].last_child {
            Some(last_child_id) => {
                nodes[child_id as usize].prev_sibling = Some(last_child_id);
                nodes[last_child_id as usize].next_sibling = Some(child_id);
            }
            None => nodes[parent_id as usize].first_child = Some(child_id),
        }
        nodes[parent_id as usize].last_child = Some(child_id);
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
