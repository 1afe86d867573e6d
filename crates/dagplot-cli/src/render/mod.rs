//! Renderers for a laid-out [`Forest`].

pub mod json;
pub mod svg;
pub mod tree;

use std::io::{self, Write};

use dagplot_core::Forest;

use crate::config::SvgConfig;
use crate::output::OutputFormat;

/// Write `forest` to `out` in `format`.
///
/// # Errors
///
/// Propagates write and serialization failures.
pub fn render(
    format: OutputFormat,
    forest: &Forest,
    svg_config: &SvgConfig,
    out: &mut dyn Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Tree => tree::write_tree(forest, out),
        OutputFormat::Json => json::write_json(forest, out),
        OutputFormat::Svg => svg::write_svg(forest, svg_config, out),
    }
}
