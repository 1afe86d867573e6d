#![forbid(unsafe_code)]
//! dagplot-core library.
//!
//! Turns `name>downstream` dependency lines into a deduplicated forest of
//! named nodes and assigns every node a grid position.
//!
//! ```text
//! lines ──parse::parse_all──▶ Vec<Dependency>
//!       ──graph::build──────▶ Forest (arena + name index + roots)
//!       ──layout::layout────▶ Forest with (x, y) on every node
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums from [`error`]; the core never prints.
//! - **Logging**: `tracing` macros (`debug!`, `trace!`, `warn!`).

pub mod error;
pub mod graph;
pub mod layout;
pub mod parse;

pub use error::{Error, ErrorCode, GraphError, LineError, ParseError};
pub use graph::{DagNode, Forest, NodeId, build, count_nodes, unconsumed_dependencies};
pub use layout::{Extent, layout};
pub use parse::{Dependency, ParsedLine, classify_line, parse_all, parse_line, read_lines};
