//! Cycle search over declared dependencies.
//!
//! # Overview
//!
//! The builder expands the forest from its roots and catches any cycle that
//! is reachable from a root. A component in which every name has an upstream
//! has no root at all and is never expanded; this module finds the cycle
//! that such a component must contain.
//!
//! # Design
//!
//! - **Colored DFS**: Gray/Black marking (absent = unvisited) on an explicit stack, so
//!   deep chains cannot overflow the call stack.
//! - **Shared colors across starts**: a name proven cycle-free is never
//!   searched again. O(V+E) overall.
//! - **Self-loops excluded**: `a>a` is left to the builder's self-reference
//!   guard and reported as an orphan, not a cycle.

use std::collections::{HashMap, HashSet};

use crate::parse::Dependency;

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Successor lists keyed by name, borrowed from a dependency slice.
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    edges: HashMap<&'a str, Vec<&'a str>>,
    /// Every name in first-encountered order.
    names: Vec<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> Adjacency<'a> {
    /// Index every non-self-loop edge of `dependencies`.
    #[must_use]
    pub fn from_dependencies(dependencies: &'a [Dependency]) -> Self {
        let mut adjacency = Self::default();
        for dep in dependencies {
            adjacency.note_name(&dep.name);
            if let Some(downstream) = dep.downstream.as_deref() {
                adjacency.note_name(downstream);
                if downstream != dep.name {
                    adjacency
                        .edges
                        .entry(dep.name.as_str())
                        .or_default()
                        .push(downstream);
                }
            }
        }
        adjacency
    }

    fn note_name(&mut self, name: &'a str) {
        if self.seen.insert(name) {
            self.names.push(name);
        }
    }

    /// Downstream names of `name` in declaration order.
    #[must_use]
    pub fn successors(&self, name: &str) -> &[&'a str] {
        self.edges.get(name).map_or(&[], Vec::as_slice)
    }

    /// Every distinct name in first-encountered order.
    #[must_use]
    pub fn names(&self) -> &[&'a str] {
        &self.names
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// DFS colors for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Currently on the DFS stack.
    Gray,
    /// Fully processed.
    Black,
}

/// Search for a cycle reachable from any of `starts`, in order.
///
/// Returns the cycle as a name path that starts and ends with the same name,
/// e.g. `["a", "b", "c", "a"]`. Self-loops are never reported.
#[must_use]
pub fn find_cycle_from<'a>(
    adjacency: &Adjacency<'a>,
    starts: impl IntoIterator<Item = &'a str>,
) -> Option<Vec<String>> {
    let mut color: HashMap<&'a str, Color> = HashMap::new();

    for start in starts {
        if color.contains_key(start) {
            continue;
        }
        if let Some(path) = dfs_cycle(adjacency, start, &mut color) {
            return Some(path);
        }
    }

    None
}

/// Iterative DFS from `start`; returns the first back edge as a path.
fn dfs_cycle<'a>(
    adjacency: &Adjacency<'a>,
    start: &'a str,
    color: &mut HashMap<&'a str, Color>,
) -> Option<Vec<String>> {
    // (name, index of the next successor to look at)
    let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
    color.insert(start, Color::Gray);

    while let Some(top) = stack.last_mut() {
        let (name, cursor) = *top;
        let Some(&next) = adjacency.successors(name).get(cursor) else {
            color.insert(name, Color::Black);
            stack.pop();
            continue;
        };
        top.1 += 1;

        match color.get(next) {
            Some(Color::Gray) => {
                let from = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                let mut path: Vec<String> =
                    stack[from..].iter().map(|(n, _)| (*n).to_string()).collect();
                path.push(next.to_string());
                return Some(path);
            }
            Some(Color::Black) => {}
            None => {
                color.insert(next, Color::Gray);
                stack.push((next, 0));
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
