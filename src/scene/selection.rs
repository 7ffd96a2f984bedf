//! Selected nodes and edges

use std::collections::HashSet;

use crate::nodes::{EdgeId, NodeId};

/// The set of items the user has selected on the canvas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: HashSet<NodeId>,
    pub edges: HashSet<EdgeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection made of the given nodes only
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            edges: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Select a single node, optionally keeping (and toggling within) the existing selection
    pub fn select_node(&mut self, node: NodeId, multi_select: bool) {
        if multi_select {
            if !self.nodes.remove(&node) {
                self.nodes.insert(node);
            }
        } else {
            self.clear();
            self.nodes.insert(node);
        }
    }

    /// Select a single edge, optionally keeping (and toggling within) the existing selection
    pub fn select_edge(&mut self, edge: EdgeId, multi_select: bool) {
        if multi_select {
            if !self.edges.remove(&edge) {
                self.edges.insert(edge);
            }
        } else {
            self.clear();
            self.edges.insert(edge);
        }
    }

    /// Drops ids for which the predicates return false
    pub fn retain(&mut self, node_exists: impl Fn(NodeId) -> bool, edge_exists: impl Fn(EdgeId) -> bool) {
        self.nodes.retain(|&id| node_exists(id));
        self.edges.retain(|&id| edge_exists(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_select_replaces() {
        let mut selection = Selection::new();
        selection.select_node(1, false);
        selection.select_edge(5, true);
        selection.select_node(2, false);
        assert!(selection.contains_node(2));
        assert!(!selection.contains_node(1));
        assert!(selection.edges.is_empty());
    }

    #[test]
    fn test_multi_select_toggles() {
        let mut selection = Selection::new();
        selection.select_node(1, true);
        selection.select_node(2, true);
        selection.select_node(1, true);
        assert_eq!(selection.nodes, HashSet::from([2]));
    }
}
