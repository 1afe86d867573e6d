//! Indented text dump.
//!
//! One line per visit: `<tabs>name[child count]`. A node with several
//! parents has its subtree printed under the first parent reached; later
//! visits print a single `name[n] (shown above)` line and stop there.

use std::collections::HashSet;
use std::io::{self, Write};

use dagplot_core::{Forest, NodeId};

const SHOWN_ABOVE: &str = " (shown above)";

pub fn write_tree(forest: &Forest, out: &mut dyn Write) -> io::Result<()> {
    let mut printed: HashSet<NodeId> = HashSet::with_capacity(forest.len());

    for &root in forest.roots() {
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = forest.node(id);
            let first_visit = printed.insert(id);
            writeln!(
                out,
                "{}{}[{}]{}",
                "\t".repeat(depth),
                node.name(),
                node.children().len(),
                if first_visit { "" } else { SHOWN_ABOVE }
            )?;
            if first_visit {
                stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1)));
            }
        }
    }
    Ok(())
}
