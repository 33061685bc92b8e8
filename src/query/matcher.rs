//! Filter and boundary conditions
//!
//! A `Matcher` is what traversal operations accept wherever a node must be
//! tested: selector text (compiled through the cache), an already compiled
//! selector, or an explicit node set matched by identity.

use std::collections::HashSet;
use std::sync::Arc;

use super::selection::Selection;
use crate::dom::{DocumentAccess, NodeId};
use crate::error::Result;
use crate::selector::{PredicateCache, Selector};

#[derive(Debug, Clone, Copy)]
pub enum Matcher<'a> {
    /// Selector text, resolved through the Selection's cache
    Selector(&'a str),
    /// Precompiled selector; never touches the cache
    Compiled(&'a Selector),
    /// Candidate nodes; a node matches when it is one of them
    Nodes(&'a [NodeId]),
}

impl<'a> Matcher<'a> {
    /// Turn the matcher into something that can test nodes.
    /// Only selector text can fail.
    pub(crate) fn resolve(self, cache: &PredicateCache) -> Result<Resolved<'a>> {
        Ok(match self {
            Matcher::Selector(text) => Resolved::Owned(cache.get(text)?),
            Matcher::Compiled(selector) => Resolved::Borrowed(selector),
            Matcher::Nodes(nodes) => Resolved::Nodes(nodes, nodes.iter().copied().collect()),
        })
    }
}

impl<'a> From<&'a str> for Matcher<'a> {
    fn from(text: &'a str) -> Self {
        Matcher::Selector(text)
    }
}

impl<'a> From<&'a String> for Matcher<'a> {
    fn from(text: &'a String) -> Self {
        Matcher::Selector(text.as_str())
    }
}

impl<'a> From<&'a Selector> for Matcher<'a> {
    fn from(selector: &'a Selector) -> Self {
        Matcher::Compiled(selector)
    }
}

impl<'a> From<&'a Arc<Selector>> for Matcher<'a> {
    fn from(selector: &'a Arc<Selector>) -> Self {
        Matcher::Compiled(selector.as_ref())
    }
}

impl<'a> From<&'a [NodeId]> for Matcher<'a> {
    fn from(nodes: &'a [NodeId]) -> Self {
        Matcher::Nodes(nodes)
    }
}

impl<'a> From<&'a Vec<NodeId>> for Matcher<'a> {
    fn from(nodes: &'a Vec<NodeId>) -> Self {
        Matcher::Nodes(nodes.as_slice())
    }
}

impl<'a> From<&'a Selection> for Matcher<'a> {
    fn from(selection: &'a Selection) -> Self {
        Matcher::Nodes(selection.nodes())
    }
}

/// A matcher ready to test nodes
pub(crate) enum Resolved<'a> {
    Owned(Arc<Selector>),
    Borrowed(&'a Selector),
    /// Candidates in their given order, plus a set for membership tests
    Nodes(&'a [NodeId], HashSet<NodeId>),
}

impl Resolved<'_> {
    pub fn selector(&self) -> Option<&Selector> {
        match self {
            Resolved::Owned(selector) => Some(selector.as_ref()),
            Resolved::Borrowed(selector) => Some(*selector),
            Resolved::Nodes(..) => None,
        }
    }

    pub fn test<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        match self {
            Resolved::Nodes(_, set) => set.contains(&node),
            _ => self.selector().is_some_and(|s| s.matches(doc, node)),
        }
    }

    /// Keep the nodes that pass `test`, in their current order
    pub fn winnow<D: DocumentAccess + ?Sized>(&self, doc: &D, nodes: Vec<NodeId>) -> Vec<NodeId> {
        nodes.into_iter().filter(|&id| self.test(doc, id)).collect()
    }
}
