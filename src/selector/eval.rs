//! Selector Evaluation
//!
//! Matches compiled selectors against elements of any `DocumentAccess`
//! tree. Only element nodes ever match.

use super::compiler::{Chain, Selector, Test};
use super::parser::{AttrOp, Combinator};
use crate::dom::{DocumentAccess, NodeId, NodeKind};

impl Selector {
    /// Does this selector match the node?
    pub fn matches<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        doc.is_element(node) && match_any(doc, &self.chains, node)
    }

    /// All matching nodes in the subtree rooted at `root`, in document order.
    /// The root itself is never part of the result.
    pub fn match_all<D: DocumentAccess + ?Sized>(&self, doc: &D, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut next = doc.first_child_of(root);

        while let Some(id) = next {
            if self.matches(doc, id) {
                result.push(id);
            }
            next = next_in_subtree(doc, root, id);
        }

        result
    }

    /// Keep the nodes that match, preserving their order
    pub fn filter<D: DocumentAccess + ?Sized>(&self, doc: &D, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|&id| self.matches(doc, id))
            .collect()
    }
}

/// Pre-order successor of `id` without leaving the subtree of `root`
fn next_in_subtree<D: DocumentAccess + ?Sized>(doc: &D, root: NodeId, id: NodeId) -> Option<NodeId> {
    if let Some(child) = doc.first_child_of(id) {
        return Some(child);
    }

    let mut current = id;
    loop {
        if let Some(sibling) = doc.next_sibling_of(current) {
            return Some(sibling);
        }
        match doc.parent_of(current) {
            Some(parent) if parent != root => current = parent,
            _ => return None,
        }
    }
}

fn match_any<D: DocumentAccess + ?Sized>(doc: &D, chains: &[Chain], node: NodeId) -> bool {
    chains.iter().any(|chain| match_steps(doc, &chain.steps, node))
}

fn match_steps<D: DocumentAccess + ?Sized>(
    doc: &D,
    steps: &[super::compiler::Step],
    node: NodeId,
) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return true;
    };

    if !step.tests.iter().all(|test| match_test(doc, test, node)) {
        return false;
    }

    match step.combinator {
        None => true,
        Some(Combinator::Child) => {
            parent_element(doc, node).is_some_and(|parent| match_steps(doc, rest, parent))
        }
        Some(Combinator::Descendant) => {
            let mut ancestor = parent_element(doc, node);
            while let Some(id) = ancestor {
                if match_steps(doc, rest, id) {
                    return true;
                }
                ancestor = parent_element(doc, id);
            }
            false
        }
        Some(Combinator::NextSibling) => {
            prev_element(doc, node).is_some_and(|sibling| match_steps(doc, rest, sibling))
        }
        Some(Combinator::SubsequentSibling) => {
            let mut sibling = prev_element(doc, node);
            while let Some(id) = sibling {
                if match_steps(doc, rest, id) {
                    return true;
                }
                sibling = prev_element(doc, id);
            }
            false
        }
    }
}

fn match_test<D: DocumentAccess + ?Sized>(doc: &D, test: &Test, node: NodeId) -> bool {
    match test {
        Test::Tag(tag) => doc
            .node_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag)),
        Test::Id(id) => doc.get_attribute(node, "id") == Some(id.as_str()),
        Test::Class(class) => doc
            .get_attribute(node, "class")
            .is_some_and(|value| contains_token(value, class)),
        Test::HasAttribute(name) => doc.get_attribute(node, name).is_some(),
        Test::Attribute(name, op, expected) => doc
            .get_attribute(node, name)
            .is_some_and(|value| match_attribute(*op, value, expected)),
        Test::FirstChild => doc.parent_of(node).is_some() && prev_element(doc, node).is_none(),
        Test::LastChild => doc.parent_of(node).is_some() && next_element(doc, node).is_none(),
        Test::OnlyChild => {
            doc.parent_of(node).is_some()
                && prev_element(doc, node).is_none()
                && next_element(doc, node).is_none()
        }
        Test::Empty => {
            let mut child = doc.first_child_of(node);
            while let Some(id) = child {
                if matches!(doc.node_kind(id), Some(NodeKind::Element | NodeKind::Text)) {
                    return false;
                }
                child = doc.next_sibling_of(id);
            }
            true
        }
        Test::Root => doc
            .parent_of(node)
            .is_some_and(|parent| doc.node_kind(parent) == Some(NodeKind::Document)),
        Test::Not(chains) => !match_any(doc, chains, node),
    }
}

fn match_attribute(op: AttrOp, value: &str, expected: &str) -> bool {
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Includes => contains_token(value, expected),
        AttrOp::DashMatch => {
            value == expected
                || value
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && value.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && value.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && value.contains(expected),
    }
}

/// Whitespace-separated token membership (class lists, `~=`)
fn contains_token(list: &str, token: &str) -> bool {
    !token.is_empty() && list.split_ascii_whitespace().any(|t| t == token)
}

fn parent_element<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    doc.parent_of(node).filter(|&p| doc.is_element(p))
}

fn prev_element<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    let mut sibling = doc.prev_sibling_of(node);
    while let Some(id) = sibling {
        if doc.is_element(id) {
            return Some(id);
        }
        sibling = doc.prev_sibling_of(id);
    }
    None
}

fn next_element<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    let mut sibling = doc.next_sibling_of(node);
    while let Some(id) = sibling {
        if doc.is_element(id) {
            return Some(id);
        }
        sibling = doc.next_sibling_of(id);
    }
    None
}
