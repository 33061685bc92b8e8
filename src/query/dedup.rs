//! Node batch merging
//!
//! Traversals produce one batch per source node; batches are concatenated
//! in source order and each node keeps only its first position.

use std::collections::HashSet;

use crate::dom::NodeId;

/// Accumulates node batches without repeats
#[derive(Debug, Default)]
pub struct NodeMerger {
    seen: HashSet<NodeId>,
    nodes: Vec<NodeId>,
}

impl NodeMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one node unless it is already present; returns whether it was added
    pub fn push(&mut self, id: NodeId) -> bool {
        let added = self.seen.insert(id);
        if added {
            self.nodes.push(id);
        }
        added
    }

    /// Append a batch, skipping nodes already present
    pub fn extend<I: IntoIterator<Item = NodeId>>(&mut self, batch: I) {
        for id in batch {
            self.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

/// Merge batches in order, keeping first occurrences
pub fn merge<I, B>(batches: I) -> Vec<NodeId>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = NodeId>,
{
    let mut merger = NodeMerger::new();
    for batch in batches {
        merger.extend(batch);
    }
    merger.into_nodes()
}
