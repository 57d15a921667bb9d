//! Ancestor index: for every position with no games of its own, the indexed
//! FENs that can be reached from it by moving forward.
//!
//! Built by walking backward edges of the transition graph from each leaf (a
//! FEN with indexed games). The walk uses an explicit stack and a per-leaf
//! visited set, so a malformed graph with cycles still terminates.

use crate::graph::TransitionGraph;
use crate::model::OpeningEntry;
use crate::position::position_key;
use std::collections::{BTreeMap, HashSet};

/// Unindexed position key -> descendant FENs in insertion order.
pub type AncestorIndex = BTreeMap<String, Vec<String>>;

pub fn build_ancestor_index(
    graph: &TransitionGraph,
    openings: &BTreeMap<String, OpeningEntry>,
) -> AncestorIndex {
    let mut leaves: Vec<&str> = openings
        .values()
        .filter(|entry| !entry.game_ids.is_empty())
        .map(|entry| entry.fen.as_str())
        .collect();
    leaves.sort_unstable();
    leaves.dedup();

    let leaf_positions: HashSet<&str> = leaves.iter().map(|fen| position_key(fen)).collect();
    let mut index = AncestorIndex::new();

    for leaf in &leaves {
        let start = position_key(leaf);
        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(position) = stack.pop() {
            for prev in graph.predecessors(position) {
                let ancestor = position_key(prev);
                if !visited.insert(ancestor) {
                    continue;
                }
                // Each (leaf, ancestor) pair is reached once, so no duplicate appends.
                if !leaf_positions.contains(ancestor) {
                    index
                        .entry(ancestor.to_string())
                        .or_default()
                        .push(leaf.to_string());
                }
                stack.push(ancestor);
            }
        }
    }

    tracing::debug!(
        leaves = leaves.len(),
        ancestors = index.len(),
        "Built ancestor index"
    );
    index
}
