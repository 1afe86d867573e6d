//! JSON document of the positioned forest.

use std::io::{self, Write};

use dagplot_core::{Extent, Forest, count_nodes};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonForest<'a> {
    roots: Vec<&'a str>,
    nodes: Vec<JsonNode<'a>>,
    node_count: usize,
    unconsumed: usize,
    extent: Extent,
}

#[derive(Debug, Serialize)]
struct JsonNode<'a> {
    name: &'a str,
    x: Option<usize>,
    y: Option<usize>,
    ancestors: Vec<&'a str>,
    children: Vec<&'a str>,
}

impl<'a> JsonForest<'a> {
    fn new(forest: &'a Forest) -> Self {
        Self {
            roots: forest
                .roots()
                .iter()
                .map(|&id| forest.node(id).name())
                .collect(),
            nodes: forest
                .iter()
                .map(|(id, node)| JsonNode {
                    name: node.name(),
                    x: node.x(),
                    y: node.y(),
                    ancestors: forest.ancestor_names(id),
                    children: forest.child_names(id),
                })
                .collect(),
            node_count: count_nodes(forest),
            unconsumed: forest.unconsumed(),
            extent: forest.extent(),
        }
    }
}

/// Nodes are listed in creation order.
pub fn write_json(forest: &Forest, out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonForest::new(forest))?;
    writeln!(out)
}
