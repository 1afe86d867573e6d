//! Forest construction from parsed dependencies.
//!
//! # Overview
//!
//! [`build`] turns an ordered dependency list into a [`Forest`]:
//!
//! 1. **Root detection**: one pass collects every downstream name. A name
//!    that never appears as a downstream is a root. Roots are created in
//!    first-encountered order.
//! 2. **Expansion**: depth-first from each root. An edge `P>C` is placed
//!    under the node named `P`. `C` is looked up in the identity map before a
//!    node is created, so diamonds converge on a single shared descendant.
//! 3. **Leaf termination**: a name with no outgoing edges is not expanded.
//! 4. **Self-reference guard**: `P>P` never spawns a child of itself.
//! 5. **Consumption accounting**: each dependency is marked consumed once,
//!    when it creates or links a node.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A is upstream of B": `B` is a child of `A` and `A`
//! is an ancestor of `B`.
//!
//! ## Cycles
//!
//! Expansion tracks the names on the current path. Reaching one of them again
//! is a [`GraphError::Cycle`]. Components without any root are checked
//! afterwards with [`super::cycles`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace, warn};

use super::cycles::{Adjacency, find_cycle_from};
use super::{Forest, NodeId};
use crate::error::GraphError;
use crate::parse::Dependency;

/// Expansion state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnPath,
    Done,
}

/// One frame of the explicit expansion stack.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    /// Index into the node's outgoing dependency list.
    cursor: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a [`Forest`] from `dependencies`, marking each one consumed as it
/// is placed.
///
/// Empty input yields an empty forest.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] if the dependencies contain a cycle other
/// than a self-loop. Consumption markers are left untouched on error.
#[instrument(skip_all, fields(dependencies = dependencies.len()))]
pub fn build(dependencies: &mut [Dependency]) -> Result<Forest, GraphError> {
    let (forest, consumed) = Builder::new(dependencies).run()?;

    for (dep, used) in dependencies.iter_mut().zip(consumed) {
        dep.consumed = used;
    }

    Ok(forest)
}

/// Dependencies the builder never placed in the forest, in input order.
pub fn unconsumed_dependencies(dependencies: &[Dependency]) -> impl Iterator<Item = &Dependency> {
    dependencies.iter().filter(|dep| !dep.consumed)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct Builder<'a> {
    deps: &'a [Dependency],
    /// Name → indices of dependencies declared with that name.
    outgoing: HashMap<&'a str, Vec<usize>>,
    consumed: Vec<bool>,
    visit: Vec<Visit>,
    forest: Forest,
}

impl<'a> Builder<'a> {
    fn new(deps: &'a [Dependency]) -> Self {
        let mut outgoing: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, dep) in deps.iter().enumerate() {
            outgoing.entry(dep.name.as_str()).or_default().push(i);
        }

        Self {
            deps,
            outgoing,
            consumed: vec![false; deps.len()],
            visit: Vec::new(),
            forest: Forest::new(),
        }
    }

    fn run(mut self) -> Result<(Forest, Vec<bool>), GraphError> {
        self.create_roots();

        let roots = self.forest.roots().to_vec();
        for root in roots {
            self.expand(root)?;
        }

        self.check_rootless_components()?;

        let unconsumed = self.consumed.iter().filter(|used| !**used).count();
        for (i, dep) in self.deps.iter().enumerate() {
            if !self.consumed[i] {
                warn!(
                    index = i,
                    name = %dep.name,
                    downstream = dep.downstream.as_deref().unwrap_or(""),
                    "dependency was never placed in the forest"
                );
            }
        }
        self.forest.set_unconsumed(unconsumed);

        debug!(
            roots = self.forest.roots().len(),
            nodes = self.forest.len(),
            unconsumed,
            "built forest"
        );
        Ok((self.forest, self.consumed))
    }

    /// Step 1: single-pass has-upstream index, then roots in first-seen order.
    fn create_roots(&mut self) {
        let has_upstream: HashSet<&str> = self
            .deps
            .iter()
            .filter_map(|dep| dep.downstream.as_deref())
            .collect();

        for dep in self.deps {
            if has_upstream.contains(dep.name.as_str()) {
                continue;
            }
            let (id, created) = self.forest.intern(&dep.name);
            if created {
                self.forest.push_root(id);
            }
        }
    }

    fn visit_state(&self, id: NodeId) -> Visit {
        self.visit
            .get(id.index())
            .copied()
            .unwrap_or(Visit::Unvisited)
    }

    fn set_visit(&mut self, id: NodeId, state: Visit) {
        if self.visit.len() <= id.index() {
            self.visit.resize(id.index() + 1, Visit::Unvisited);
        }
        self.visit[id.index()] = state;
    }

    /// Steps 2–5 for one root, depth-first on an explicit stack.
    fn expand(&mut self, root: NodeId) -> Result<(), GraphError> {
        if self.visit_state(root) != Visit::Unvisited {
            return Ok(());
        }

        let deps = self.deps;
        let mut stack = vec![Frame {
            node: root,
            cursor: 0,
        }];
        self.set_visit(root, Visit::OnPath);

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let next = self
                .outgoing
                .get(self.forest.node(node).name())
                .and_then(|edges| edges.get(frame.cursor))
                .copied();

            let Some(dep_index) = next else {
                self.set_visit(node, Visit::Done);
                stack.pop();
                continue;
            };
            frame.cursor += 1;

            let dep = &deps[dep_index];
            let Some(child_name) = dep.downstream.as_deref() else {
                // Standalone declaration of a node that already exists.
                self.consumed[dep_index] = true;
                continue;
            };

            if child_name == dep.name {
                // The orphan pass warns about it once.
                trace!(name = %dep.name, "skipping self-referencing dependency");
                continue;
            }

            let (child, created) = self.forest.intern(child_name);
            let state = self.visit_state(child);
            if state == Visit::OnPath {
                return Err(self.cycle_error(&stack, child));
            }

            if self.forest.link(node, child) {
                trace!(parent = %dep.name, child = child_name, created, "linked");
            } else {
                trace!(parent = %dep.name, child = child_name, "duplicate edge");
            }
            self.consumed[dep_index] = true;

            if state == Visit::Unvisited {
                self.set_visit(child, Visit::OnPath);
                stack.push(Frame {
                    node: child,
                    cursor: 0,
                });
            }
        }

        Ok(())
    }

    fn cycle_error(&self, stack: &[Frame], repeated: NodeId) -> GraphError {
        let from = stack
            .iter()
            .position(|frame| frame.node == repeated)
            .unwrap_or(0);
        let mut path: Vec<String> = stack[from..]
            .iter()
            .map(|frame| self.forest.node(frame.node).name().to_string())
            .collect();
        let repeated_name = self.forest.node(repeated).name().to_string();
        path.push(repeated_name.clone());
        GraphError::Cycle {
            repeated_name,
            path,
        }
    }

    /// Unconsumed non-self-loop edges sit in components with no root, which
    /// in a finite graph means a cycle (unless only a self-loop feeds them).
    fn check_rootless_components(&self) -> Result<(), GraphError> {
        let starts: Vec<&'a str> = self
            .deps
            .iter()
            .enumerate()
            .filter(|(i, dep)| !self.consumed[*i] && !dep.is_self_loop())
            .map(|(_, dep)| dep.name.as_str())
            .collect();

        if starts.is_empty() {
            return Ok(());
        }

        let adjacency = Adjacency::from_dependencies(self.deps);
        match find_cycle_from(&adjacency, starts) {
            Some(path) => {
                let repeated_name = path.last().cloned().unwrap_or_default();
                Err(GraphError::Cycle {
                    repeated_name,
                    path,
                })
            }
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::count_nodes;

    fn edges(pairs: &[(&str, &str)]) -> Vec<Dependency> {
        pairs.iter().map(|(a, b)| Dependency::edge(*a, *b)).collect()
    }

    fn root_names(forest: &Forest) -> Vec<&str> {
        forest
            .roots()
            .iter()
            .map(|&id| forest.node(id).name())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Empty / trivial inputs
    // -----------------------------------------------------------------------

    #[test]
    fn empty_input_yields_empty_forest() {
        let mut deps: Vec<Dependency> = Vec::new();
        let forest = build(&mut deps).expect("should build");
        assert!(forest.is_empty());
        assert!(forest.roots().is_empty());
        assert_eq!(forest.unconsumed(), 0);
    }

    #[test]
    fn standalone_node() {
        let mut deps = vec![Dependency::standalone("a")];
        let forest = build(&mut deps).expect("should build");
        assert!(deps[0].is_consumed());
        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(count_nodes(&forest), 1);
    }

    #[test]
    fn single_dependency() {
        let mut deps = edges(&[("a", "b")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(count_nodes(&forest), 2);
        assert!(deps[0].is_consumed());
    }

    #[test]
    fn double_dependency() {
        let mut deps = edges(&[("a", "b"), ("b", "c")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(count_nodes(&forest), 3);
    }

    #[test]
    fn reversed_declaration_still_has_single_root() {
        let mut deps = edges(&[("b", "c"), ("a", "b")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(count_nodes(&forest), 3);
    }

    // -----------------------------------------------------------------------
    // Identity / convergence
    // -----------------------------------------------------------------------

    #[test]
    fn diamond_converges_on_one_node() {
        let mut deps = edges(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        let forest = build(&mut deps).expect("should build");

        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(forest.len(), 4);
        assert_eq!(count_nodes(&forest), 4);

        let d = forest.id_of("d").expect("d exists");
        assert_eq!(forest.ancestor_names(d), ["b", "c"]);
        assert!(deps.iter().all(Dependency::is_consumed));
    }

    #[test]
    fn shared_node_across_roots() {
        let mut deps = edges(&[("a", "x"), ("b", "x"), ("x", "y")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a", "b"]);
        assert_eq!(forest.len(), 4);

        let x = forest.id_of("x").expect("x exists");
        assert_eq!(forest.ancestor_names(x), ["a", "b"]);
        assert_eq!(forest.child_names(x), ["y"]);
    }

    #[test]
    fn children_keep_declaration_order() {
        let mut deps = edges(&[("a", "c"), ("a", "b"), ("a", "d")]);
        let forest = build(&mut deps).expect("should build");
        let a = forest.id_of("a").expect("a exists");
        assert_eq!(forest.child_names(a), ["c", "b", "d"]);
    }

    #[test]
    fn duplicate_edge_links_once_and_is_consumed() {
        let mut deps = edges(&[("a", "b"), ("a", "b")]);
        let forest = build(&mut deps).expect("should build");
        let a = forest.id_of("a").expect("a exists");
        assert_eq!(forest.child_names(a), ["b"]);
        assert!(deps.iter().all(Dependency::is_consumed));
        assert_eq!(forest.unconsumed(), 0);
    }

    #[test]
    fn duplicate_root_references_create_one_root() {
        let mut deps = edges(&[("a", "b"), ("c", "d"), ("a", "e")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a", "c"]);
    }

    #[test]
    fn standalone_redeclaration_of_child_is_consumed() {
        let mut deps = edges(&[("a", "b")]);
        deps.push(Dependency::standalone("b"));
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["a"]);
        assert_eq!(forest.len(), 2);
        assert!(deps[1].is_consumed());
    }

    #[test]
    fn independent_components_keep_root_order() {
        let mut deps = edges(&[("q", "r")]);
        deps.push(Dependency::standalone("solo"));
        deps.extend(edges(&[("m", "n")]));
        let forest = build(&mut deps).expect("should build");
        assert_eq!(root_names(&forest), ["q", "solo", "m"]);
    }

    // -----------------------------------------------------------------------
    // Self-loops and cycles
    // -----------------------------------------------------------------------

    #[test]
    fn self_loop_is_orphaned_not_fatal() {
        let mut deps = edges(&[("r", "a"), ("a", "a")]);
        let forest = build(&mut deps).expect("should build");
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.unconsumed(), 1);
        let orphans: Vec<_> = unconsumed_dependencies(&deps).collect();
        assert_eq!(orphans, [&Dependency::edge("a", "a")]);
    }

    #[test]
    fn lone_self_loop_yields_empty_forest() {
        let mut deps = edges(&[("a", "a")]);
        let forest = build(&mut deps).expect("should build");
        assert!(forest.is_empty());
        assert_eq!(forest.unconsumed(), 1);
    }

    #[test]
    fn reachable_cycle_is_rejected() {
        let mut deps = edges(&[("r", "a"), ("a", "b"), ("b", "c"), ("c", "a")]);
        let err = build(&mut deps).expect_err("cycle");
        assert_eq!(
            err,
            GraphError::Cycle {
                repeated_name: "a".into(),
                path: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }
        );
        assert!(deps.iter().all(|d| !d.is_consumed()));
    }

    #[test]
    fn rootless_cycle_is_rejected() {
        let mut deps = edges(&[("x", "y"), ("y", "x")]);
        let err = build(&mut deps).expect_err("cycle");
        assert!(matches!(err, GraphError::Cycle { ref repeated_name, .. } if repeated_name == "x"));
    }

    #[test]
    fn component_fed_only_by_self_loop_is_orphaned() {
        let mut deps = edges(&[("x", "x"), ("x", "y")]);
        let forest = build(&mut deps).expect("should build");
        assert!(forest.is_empty());
        assert_eq!(forest.unconsumed(), 2);
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let names: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let mut deps: Vec<Dependency> = names
            .windows(2)
            .map(|w| Dependency::edge(w[0].as_str(), w[1].as_str()))
            .collect();
        let forest = build(&mut deps).expect("should build");
        assert_eq!(forest.len(), 20_000);
        assert_eq!(root_names(&forest), ["n0"]);
    }
}
