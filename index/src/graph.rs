//! Position transition graph.
//!
//! A precomputed artifact mapping each known position to the FENs one ply
//! forward (`next`) and one ply back (`prev`). Keys are position keys; edge
//! targets are full FENs.

use crate::position::position_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransitionNode {
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default)]
    pub prev: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TransitionGraph {
    nodes: HashMap<String, TransitionNode>,
}

impl TransitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(from_fen, to_fen)` moves, recording both
    /// directions of every edge.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    pub fn add_edge(&mut self, from_fen: &str, to_fen: &str) {
        let forward = self
            .nodes
            .entry(position_key(from_fen).to_string())
            .or_default();
        if !forward.next.iter().any(|f| f == to_fen) {
            forward.next.push(to_fen.to_string());
        }

        let backward = self
            .nodes
            .entry(position_key(to_fen).to_string())
            .or_default();
        if !backward.prev.iter().any(|f| f == from_fen) {
            backward.prev.push(from_fen.to_string());
        }
    }

    /// FENs one ply forward from `position`.
    pub fn successors(&self, position: &str) -> &[String] {
        self.nodes
            .get(position)
            .map(|n| n.next.as_slice())
            .unwrap_or(&[])
    }

    /// FENs one ply back from `position`.
    pub fn predecessors(&self, position: &str) -> &[String] {
        self.nodes
            .get(position)
            .map(|n| n.prev.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{AFTER_E4, AFTER_E4_E5, START};

    #[test]
    fn test_from_edges_records_both_directions() {
        let graph = TransitionGraph::from_edges([(START, AFTER_E4), (AFTER_E4, AFTER_E4_E5)]);

        assert_eq!(graph.successors(position_key(START)), [AFTER_E4.to_string()]);
        assert_eq!(
            graph.predecessors(position_key(AFTER_E4_E5)),
            [AFTER_E4.to_string()]
        );
        assert!(graph.predecessors(position_key(START)).is_empty());
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_duplicate_edges_are_collapsed() {
        let graph = TransitionGraph::from_edges([(START, AFTER_E4), (START, AFTER_E4)]);
        assert_eq!(graph.successors(position_key(START)).len(), 1);
        assert_eq!(graph.predecessors(position_key(AFTER_E4)).len(), 1);
    }

    #[test]
    fn test_unknown_position_has_no_edges() {
        let graph = TransitionGraph::new();
        assert!(graph.is_empty());
        assert!(graph.successors("8/8/8/8/8/8/8/8").is_empty());
    }

    #[test]
    fn test_deserializes_artifact_shape() {
        let json = format!(
            r#"{{"{}": {{"next": ["{}"]}}}}"#,
            position_key(START),
            AFTER_E4
        );
        let graph: TransitionGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph.successors(position_key(START)), [AFTER_E4.to_string()]);
        assert!(graph.predecessors(position_key(START)).is_empty());
    }
}
