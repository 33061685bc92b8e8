//! Traversal Axes
//!
//! Per-node traversals behind the Selection operations:
//! - children, contents (one level down)
//! - parent, parents (up, with optional boundary)
//! - siblings in every direction (with optional boundary)
//! - closest (self, then ancestors)
//! - find (strict descendants)
//!
//! Boundaries are exclusive: a scan stops before the first node that
//! passes the boundary test.

use super::matcher::Resolved;
use crate::dom::{DocumentAccess, NodeId};

/// Which siblings a sibling scan returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingKind {
    /// Nearest previous element only
    Prev,
    /// Previous elements, nearest first
    PrevAll,
    /// Previous elements, nearest first, stopping before the boundary
    PrevUntil,
    /// Next element only
    Next,
    /// Following elements in document order
    NextAll,
    /// Following elements, stopping before the boundary
    NextUntil,
    /// Every element sibling except the node itself, in document order
    All,
}

/// Element children
pub fn children<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut child = doc.first_child_of(node);
    while let Some(id) = child {
        if doc.is_element(id) {
            result.push(id);
        }
        child = doc.next_sibling_of(id);
    }
    result
}

/// All children, text and comments included
pub fn contents<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut child = doc.first_child_of(node);
    while let Some(id) = child {
        result.push(id);
        child = doc.next_sibling_of(id);
    }
    result
}

/// The parent, if it is an element
pub fn parent<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    doc.parent_of(node).filter(|&p| doc.is_element(p))
}

/// Element ancestors, nearest first.
///
/// The boundary is tested against every ancestor, the document node
/// included; the walk stops before the first one that passes.
pub fn parents<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    until: Option<&Resolved<'_>>,
) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut current = doc.parent_of(node);

    while let Some(id) = current {
        if until.is_some_and(|boundary| boundary.test(doc, id)) {
            break;
        }
        if doc.is_element(id) {
            result.push(id);
        }
        current = doc.parent_of(id);
    }

    result
}

/// Element siblings of `node` in the requested direction.
/// A node without a parent has no siblings.
pub fn siblings<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    kind: SiblingKind,
    until: Option<&Resolved<'_>>,
) -> Vec<NodeId> {
    let Some(parent) = doc.parent_of(node) else {
        return Vec::new();
    };

    match kind {
        SiblingKind::All => children(doc, parent)
            .into_iter()
            .filter(|&id| id != node)
            .collect(),
        SiblingKind::Prev | SiblingKind::PrevAll | SiblingKind::PrevUntil => scan(
            doc,
            doc.prev_sibling_of(node),
            |id| doc.prev_sibling_of(id),
            kind == SiblingKind::Prev,
            until.filter(|_| kind == SiblingKind::PrevUntil),
        ),
        SiblingKind::Next | SiblingKind::NextAll | SiblingKind::NextUntil => scan(
            doc,
            doc.next_sibling_of(node),
            |id| doc.next_sibling_of(id),
            kind == SiblingKind::Next,
            until.filter(|_| kind == SiblingKind::NextUntil),
        ),
    }
}

/// Walk a sibling chain collecting elements
fn scan<D, F>(
    doc: &D,
    start: Option<NodeId>,
    step: F,
    first_only: bool,
    until: Option<&Resolved<'_>>,
) -> Vec<NodeId>
where
    D: DocumentAccess + ?Sized,
    F: Fn(NodeId) -> Option<NodeId>,
{
    let mut result = Vec::new();
    let mut current = start;

    while let Some(id) = current {
        if doc.is_element(id) {
            if until.is_some_and(|boundary| boundary.test(doc, id)) {
                break;
            }
            result.push(id);
            if first_only {
                break;
            }
        }
        current = step(id);
    }

    result
}

/// First of {node, its ancestors} that passes `condition`
pub fn closest<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    condition: &Resolved<'_>,
) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(id) = current {
        if condition.test(doc, id) {
            return Some(id);
        }
        current = doc.parent_of(id);
    }
    None
}

/// Matches strictly below `node`.
///
/// Selectors yield document order. Node sets yield their members in the
/// set's own order. Callers run this once per source node and merge the
/// batches in source order, so with several sources the result is grouped
/// by source rather than by candidate.
pub fn find<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    condition: &Resolved<'_>,
) -> Vec<NodeId> {
    match condition {
        Resolved::Nodes(candidates, _) => candidates
            .iter()
            .copied()
            .filter(|&id| is_descendant(doc, id, node))
            .collect(),
        _ => condition
            .selector()
            .map(|selector| selector.match_all(doc, node))
            .unwrap_or_default(),
    }
}

/// Whether `ancestor` is a proper ancestor of `node`
pub fn is_descendant<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = doc.parent_of(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = doc.parent_of(id);
    }
    false
}
