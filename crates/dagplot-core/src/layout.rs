//! Grid layout for a built forest.
//!
//! # Algorithm
//!
//! 1. **Column (`x`)**: longest path from any root. Mirror the arena into a
//!    `petgraph` digraph, sort it topologically, then run a forward pass:
//!    `x(child) = max(x(ancestor) + 1)`, roots at `0`.
//! 2. **Row (`y`)**: one counter shared across the whole forest. Roots are
//!    walked in declaration order, each subtree depth-first in pre-order with
//!    children in declaration order. A node takes the next row the first time
//!    it is reached.
//!
//! Every run starts from cleared coordinates, so layout is idempotent.
//!
//! Because `x` is a longest path, every edge points strictly rightwards:
//! `x(parent) < x(child)`. Rows are globally unique, which makes them unique
//! within each column too.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::{Forest, NodeId};

/// Size of the occupied grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Extent {
    /// Number of columns (`max x + 1`), `0` when nothing is positioned.
    pub columns: usize,
    /// Number of rows (`max y + 1`), `0` when nothing is positioned.
    pub rows: usize,
}

/// Assign `(x, y)` to every node of `forest`.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] if the links contain a cycle. Forests
/// produced by [`crate::graph::build`] never do. The error's `path` holds
/// only the single node the topological sort stopped at.
#[instrument(skip_all, fields(nodes = forest.len()))]
pub fn layout(forest: &mut Forest) -> Result<(), GraphError> {
    for node in forest.nodes_mut() {
        node.x = None;
        node.y = None;
    }

    let columns = assign_columns(forest)?;
    let rows = assign_rows(forest);

    for (node, (x, y)) in forest
        .nodes_mut()
        .iter_mut()
        .zip(columns.into_iter().zip(rows))
    {
        node.x = Some(x);
        node.y = y;
    }

    let extent = forest.extent();
    debug!(columns = extent.columns, rows = extent.rows, "laid out forest");
    Ok(())
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Longest-path depth for every arena slot.
fn assign_columns(forest: &Forest) -> Result<Vec<usize>, GraphError> {
    // Arena index i becomes NodeIndex i.
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(forest.len(), forest.len());
    for _ in 0..forest.len() {
        graph.add_node(());
    }
    for (id, node) in forest.iter() {
        for child in node.children() {
            graph.add_edge(NodeIndex::new(id.index()), NodeIndex::new(child.index()), ());
        }
    }

    // petgraph names one node on the cycle, not the whole loop.
    let order = toposort(&graph, None).map_err(|cycle| {
        let name = forest.node(NodeId(cycle.node_id().index())).name().to_string();
        GraphError::Cycle {
            repeated_name: name.clone(),
            path: vec![name],
        }
    })?;

    let mut columns = vec![0_usize; forest.len()];
    for v in order {
        columns[v.index()] = graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| columns[e.source().index()] + 1)
            .max()
            .unwrap_or(0);
    }
    Ok(columns)
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Pre-order row numbers; `None` for nodes unreachable from any root.
fn assign_rows(forest: &Forest) -> Vec<Option<usize>> {
    let mut rows: Vec<Option<usize>> = vec![None; forest.len()];
    let mut next_row = 0_usize;

    for &root in forest.roots() {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if rows[id.index()].is_some() {
                continue;
            }
            rows[id.index()] = Some(next_row);
            next_row += 1;

            // Reversed so the first child is popped first.
            stack.extend(
                forest
                    .node(id)
                    .children()
                    .iter()
                    .rev()
                    .filter(|c| rows[c.index()].is_none()),
            );
        }
    }

    rows
}

// ---------------------------------------------------------------------------
// Forest helpers
// ---------------------------------------------------------------------------

impl Forest {
    /// Returns `true` if every node has both coordinates.
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.iter().all(|(_, node)| node.position().is_some())
    }

    /// Grid size spanned by positioned nodes.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.iter()
            .filter_map(|(_, node)| node.position())
            .fold(Extent::default(), |acc, (x, y)| Extent {
                columns: acc.columns.max(x + 1),
                rows: acc.rows.max(y + 1),
            })
    }
}
