//! SVG rendering: one box per node, one arrow per edge.
//!
//! A node at grid `(x, y)` is drawn at
//! `(x * x_step + offset, y * y_step + offset)`. Edges run from the middle
//! of the parent's right side to the middle of the child's left side. Boxes
//! are emitted once even when a node has several parents.

use std::collections::HashSet;
use std::io::{self, Write};

use dagplot_core::{DagNode, Forest, NodeId};

use crate::config::SvgConfig;

const ARROW_MARKER_ID: &str = "arrow";

/// Cut `name` to `max_len` characters, appending `...` when shortened.
#[must_use]
pub fn truncate_label(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    let mut label: String = name.chars().take(max_len).collect();
    label.push_str("...");
    label
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

struct Geometry<'a> {
    config: &'a SvgConfig,
}

impl Geometry<'_> {
    /// Top-left corner of the node's box. Unpositioned nodes sit at the origin.
    fn corner(&self, node: &DagNode) -> (usize, usize) {
        let (x, y) = node.position().unwrap_or((0, 0));
        (
            x * self.config.x_step() + self.config.offset,
            y * self.config.y_step() + self.config.offset,
        )
    }

    const fn mid_height(&self) -> usize {
        self.config.node_height / 2
    }
}

pub fn write_svg(forest: &Forest, config: &SvgConfig, out: &mut dyn Write) -> io::Result<()> {
    let extent = forest.extent();
    let width = extent.columns * config.x_step() + config.offset;
    let height = extent.rows * config.y_step() + config.offset;

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" baseProfile="full" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(out, "<title>{}</title>", escape_xml(&config.title))?;
    writeln!(out, "<desc>Generated by dagplot</desc>")?;
    write_defs(config, out)?;
    write_style(config, out)?;

    let geometry = Geometry { config };
    let mut drawn: HashSet<NodeId> = HashSet::with_capacity(forest.len());

    // (node, parent) in pre-order; the edge is drawn before the child box.
    let mut stack: Vec<(NodeId, Option<NodeId>)> =
        forest.roots().iter().rev().map(|&id| (id, None)).collect();
    while let Some((id, parent)) = stack.pop() {
        if let Some(parent) = parent {
            write_edge(&geometry, forest.node(parent), forest.node(id), out)?;
        }
        if !drawn.insert(id) {
            continue;
        }
        let node = forest.node(id);
        write_node(&geometry, node, out)?;
        stack.extend(node.children().iter().rev().map(|&c| (c, Some(id))));
    }

    writeln!(out, "</svg>")
}

fn write_defs(config: &SvgConfig, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "<defs>")?;
    writeln!(
        out,
        r#" <marker id="{ARROW_MARKER_ID}" viewBox="0 0 10 10" refX="5" refY="5" markerWidth="12" markerHeight="12" orient="auto-start-reverse">"#
    )?;
    writeln!(
        out,
        r#"  <path d="M 0 0 L 10 5 L 0 10 z" fill="{}" />"#,
        escape_xml(&config.edge_color)
    )?;
    writeln!(out, " </marker>")?;
    writeln!(out, "</defs>")
}

fn write_style(config: &SvgConfig, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, r#"<style type="text/css">"#)?;
    writeln!(
        out,
        "rect {{ stroke: {}; fill: {}; }}",
        escape_xml(&config.node_stroke),
        escape_xml(&config.node_fill)
    )?;
    writeln!(out, "text {{ fill: #000; font-family: Arial, Sans-serif; }}")?;
    writeln!(out, "line {{ stroke: {}; }}", escape_xml(&config.edge_color))?;
    writeln!(out, "</style>")
}

fn write_node(geometry: &Geometry<'_>, node: &DagNode, out: &mut dyn Write) -> io::Result<()> {
    let config = geometry.config;
    let (left, top) = geometry.corner(node);
    let label = escape_xml(&truncate_label(node.name(), config.label_max_len));

    writeln!(
        out,
        r#"<rect x="{left}" y="{top}" width="{}" height="{}" />"#,
        config.node_width, config.node_height
    )?;
    writeln!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{label}</text>"#,
        left + config.node_width / 2,
        top + geometry.mid_height()
    )
}

fn write_edge(
    geometry: &Geometry<'_>,
    from: &DagNode,
    to: &DagNode,
    out: &mut dyn Write,
) -> io::Result<()> {
    let (from_left, from_top) = geometry.corner(from);
    let (to_left, to_top) = geometry.corner(to);
    writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{to_left}" y2="{}" marker-end="url(#{ARROW_MARKER_ID})" />"#,
        from_left + geometry.config.node_width,
        from_top + geometry.mid_height(),
        to_top + geometry.mid_height()
    )
}
