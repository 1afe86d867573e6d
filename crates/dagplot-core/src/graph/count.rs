//! Distinct-node counting.

use std::collections::HashSet;

use super::{Forest, NodeId};

/// Count distinct nodes reachable from the forest roots.
///
/// A node shared by several parents or roots is counted once.
#[must_use]
pub fn count_nodes(forest: &Forest) -> usize {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(forest.len());
    let mut stack: Vec<NodeId> = forest.roots().to_vec();

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        stack.extend(
            forest
                .node(id)
                .children()
                .iter()
                .filter(|c| !seen.contains(*c)),
        );
    }

    seen.len()
}
