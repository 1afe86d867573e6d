//! Optional `dagplot.toml` configuration.
//!
//! Lookup order: `--config <path>`, then `./dagplot.toml`, then defaults.
//! Every field is optional; a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliFailure;
use crate::output::OutputFormat;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dagplot.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagplotConfig {
    #[serde(default)]
    pub svg: SvgConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Geometry and colours of the SVG renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgConfig {
    /// Distance from the canvas corner to the first box.
    #[serde(default = "default_offset")]
    pub offset: usize,
    #[serde(default = "default_node_width")]
    pub node_width: usize,
    #[serde(default = "default_node_height")]
    pub node_height: usize,
    /// Horizontal space between two columns of boxes.
    #[serde(default = "default_column_gap")]
    pub column_gap: usize,
    /// Vertical space between two rows of boxes.
    #[serde(default = "default_row_gap")]
    pub row_gap: usize,
    /// Labels longer than this many characters are cut and get `...`.
    #[serde(default = "default_label_max_len")]
    pub label_max_len: usize,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_edge_color")]
    pub edge_color: String,
    #[serde(default = "default_node_fill")]
    pub node_fill: String,
    #[serde(default = "default_node_stroke")]
    pub node_stroke: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            node_width: default_node_width(),
            node_height: default_node_height(),
            column_gap: default_column_gap(),
            row_gap: default_row_gap(),
            label_max_len: default_label_max_len(),
            title: default_title(),
            edge_color: default_edge_color(),
            node_fill: default_node_fill(),
            node_stroke: default_node_stroke(),
        }
    }
}

impl SvgConfig {
    /// Horizontal distance between the left edges of adjacent columns.
    #[must_use]
    pub const fn x_step(&self) -> usize {
        self.node_width + self.column_gap
    }

    /// Vertical distance between the top edges of adjacent rows.
    #[must_use]
    pub const fn y_step(&self) -> usize {
        self.node_height + self.row_gap
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Format used when neither `--format` nor `DAGPLOT_FORMAT` is set.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

const fn default_offset() -> usize {
    25
}

const fn default_node_width() -> usize {
    240
}

const fn default_node_height() -> usize {
    40
}

const fn default_column_gap() -> usize {
    100
}

const fn default_row_gap() -> usize {
    50
}

const fn default_label_max_len() -> usize {
    23
}

fn default_title() -> String {
    "DAG".to_string()
}

fn default_edge_color() -> String {
    "#f00".to_string()
}

fn default_node_fill() -> String {
    "#ccc".to_string()
}

fn default_node_stroke() -> String {
    "#888".to_string()
}

/// Load configuration from `explicit`, else `<cwd>/dagplot.toml`, else
/// defaults.
///
/// # Errors
///
/// An explicit path that cannot be read, or any file that is not valid TOML
/// for [`DagplotConfig`], is an error. A missing default file is not.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<DagplotConfig, CliFailure> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                debug!("no config file, using defaults");
                return Ok(DagplotConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| CliFailure::ReadConfig {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| CliFailure::ParseConfig {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse TOML text into a [`DagplotConfig`].
///
/// # Errors
///
/// Returns the TOML error for malformed text or mistyped fields.
pub fn parse_config(content: &str) -> Result<DagplotConfig, toml::de::Error> {
    toml::from_str(content)
}
