//! Dependency forest: an arena of uniquely-named nodes.
//!
//! # Overview
//!
//! A [`Forest`] is the sole owner of every [`DagNode`]. Nodes refer to each
//! other by [`NodeId`] (an index into the arena), never by shared ownership,
//! so parent→child and child→ancestor links cannot form retain cycles.
//!
//! ## Pipeline
//!
//! ```text
//! Vec<Dependency>
//!        ↓  build::build()
//! Forest (roots in first-encountered order, one node per name)
//!        ↓  crate::layout::layout()
//! Forest with x/y on every node
//! ```
//!
//! ## Invariants
//!
//! - At most one node per distinct name (`index` is an identity map).
//! - A root is a name that never appears as a downstream value.
//! - Every node in the arena is reachable from some root.
//! - Links never close a cycle; the builder rejects cyclic input.

#![allow(clippy::module_name_repetitions)]

pub mod build;
pub mod count;
pub mod cycles;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

pub use build::{build, unconsumed_dependencies};
pub use count::count_nodes;

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Index of a node in its [`Forest`] arena.
///
/// Only meaningful for the forest that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DagNode
// ---------------------------------------------------------------------------

/// A uniquely-named vertex of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagNode {
    name: String,
    /// Non-owning back-references, in the order the links were made.
    ancestors: Vec<NodeId>,
    /// Forward references in declaration order.
    children: Vec<NodeId>,
    /// Column; `None` until laid out.
    pub(crate) x: Option<usize>,
    /// Row; `None` until laid out.
    pub(crate) y: Option<usize>,
}

impl DagNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            children: Vec::new(),
            x: None,
            y: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.ancestors
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Column (longest path from any root), once laid out.
    #[must_use]
    pub const fn x(&self) -> Option<usize> {
        self.x
    }

    /// Row, once laid out.
    #[must_use]
    pub const fn y(&self) -> Option<usize> {
        self.y
    }

    /// `(x, y)` if both coordinates are assigned.
    #[must_use]
    pub const fn position(&self) -> Option<(usize, usize)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// The ordered collection of root nodes plus the arena that owns them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    nodes: Vec<DagNode>,
    /// Identity map: name → arena index.
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    /// Number of dependencies the builder could not place.
    unconsumed: usize,
}

impl Forest {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root ids in first-encountered order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of input dependencies that were never placed in the forest.
    #[must_use]
    pub const fn unconsumed(&self) -> usize {
        self.unconsumed
    }

    /// Borrow the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this forest.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &DagNode {
        &self.nodes[id.0]
    }

    /// Look up a node id by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Look up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DagNode> {
        self.id_of(name).map(|id| self.node(id))
    }

    /// Iterate all nodes with their ids in arena (creation) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DagNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Names of the children of `id`, in declaration order.
    #[must_use]
    pub fn child_names(&self, id: NodeId) -> Vec<&str> {
        self.node(id)
            .children
            .iter()
            .map(|&c| self.node(c).name())
            .collect()
    }

    /// Names of the ancestors of `id`, in link order.
    #[must_use]
    pub fn ancestor_names(&self, id: NodeId) -> Vec<&str> {
        self.node(id)
            .ancestors
            .iter()
            .map(|&a| self.node(a).name())
            .collect()
    }

    // -- construction (builder only) ---------------------------------------

    /// Return the id registered for `name`, creating the node if absent.
    pub(crate) fn intern(&mut self, name: &str) -> (NodeId, bool) {
        if let Some(&id) = self.index.get(name) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(DagNode::new(name));
        self.index.insert(name.to_string(), id);
        (id, true)
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Link `parent → child`. Returns `false` if the link already existed.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes[parent.0].children.contains(&child) {
            return false;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].ancestors.push(parent);
        true
    }

    pub(crate) const fn set_unconsumed(&mut self, count: usize) {
        self.unconsumed = count;
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [DagNode] {
        &mut self.nodes
    }
}
