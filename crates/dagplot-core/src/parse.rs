//! Dependency line parser.
//!
//! # Line format
//!
//! ```text
//! name              standalone node
//! name>downstream   edge name → downstream
//! # comment         ignored
//! ```
//!
//! - Surrounding whitespace of both halves is trimmed.
//! - Comment lines start with `#` and are returned as [`ParsedLine::Comment`].
//! - Blank/whitespace-only lines are returned as [`ParsedLine::Blank`].
//! - At most one `>` is allowed per line.
//!
//! Input order is preserved by [`parse_all`]; the graph builder relies on it
//! for deterministic root ordering.

use std::io::{self, BufRead};

use serde::Serialize;
use tracing::debug;

use crate::error::{LineError, ParseError};

/// Separator between a node name and its downstream.
pub const SEPARATOR: char = '>';

/// Prefix marking a comment line.
pub const COMMENT_PREFIX: char = '#';

// ---------------------------------------------------------------------------
// Dependency
// ---------------------------------------------------------------------------

/// One declared edge `name → downstream`, or a standalone node when
/// `downstream` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub downstream: Option<String>,
    /// Set by the graph builder once this record created or linked a node.
    #[serde(skip)]
    pub(crate) consumed: bool,
}

impl Dependency {
    /// An edge `name → downstream`.
    #[must_use]
    pub fn edge(name: impl Into<String>, downstream: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            downstream: Some(downstream.into()),
            consumed: false,
        }
    }

    /// A standalone node declaration.
    #[must_use]
    pub fn standalone(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            downstream: None,
            consumed: false,
        }
    }

    /// Returns `true` once the builder has placed this record in a forest.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Returns `true` for `a>a`.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.downstream.as_deref() == Some(self.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Single-line parsing
// ---------------------------------------------------------------------------

/// The classification of one raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A blank or whitespace-only line.
    Blank,
    /// A comment line. The text includes the `#` prefix.
    Comment(String),
    Dependency(Dependency),
}

/// Parse one non-blank, non-comment line into a [`Dependency`].
///
/// Everything before the first `>` is the name, everything after it the
/// downstream; both are trimmed. A line without `>` is a standalone node.
///
/// # Errors
///
/// - [`LineError::MultipleSeparators`] if the line holds more than one `>`.
/// - [`LineError::EmptyName`] for `>b`.
/// - [`LineError::EmptyDownstream`] for `a>`.
pub fn parse_line(line: &str) -> Result<Dependency, LineError> {
    let count = line.matches(SEPARATOR).count();
    if count > 1 {
        return Err(LineError::MultipleSeparators { count });
    }

    let Some((name, downstream)) = line.split_once(SEPARATOR) else {
        return Ok(Dependency::standalone(line.trim()));
    };

    let name = name.trim();
    let downstream = downstream.trim();
    if name.is_empty() {
        return Err(LineError::EmptyName);
    }
    if downstream.is_empty() {
        return Err(LineError::EmptyDownstream);
    }

    Ok(Dependency::edge(name, downstream))
}

/// Classify a raw line as blank, comment, or dependency.
///
/// # Errors
///
/// Propagates [`parse_line`] failures for dependency lines.
pub fn classify_line(line: &str) -> Result<ParsedLine, LineError> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Ok(ParsedLine::Blank);
    }

    if trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(ParsedLine::Comment(trimmed.to_string()));
    }

    parse_line(trimmed).map(ParsedLine::Dependency)
}

// ---------------------------------------------------------------------------
// Multi-line parsing
// ---------------------------------------------------------------------------

/// Parse a sequence of lines into dependencies, preserving input order.
///
/// Blank and comment lines are skipped.
///
/// # Errors
///
/// Returns [`ParseError::MalformedLine`] for the first malformed line. Line
/// numbers are 1-indexed positions in `lines`.
pub fn parse_all<I, S>(lines: I) -> Result<Vec<Dependency>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut dependencies = Vec::new();
    let mut skipped = 0_usize;

    for (i, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        match classify_line(line) {
            Ok(ParsedLine::Dependency(dep)) => dependencies.push(dep),
            Ok(ParsedLine::Blank | ParsedLine::Comment(_)) => skipped += 1,
            Err(reason) => {
                return Err(ParseError::MalformedLine {
                    line: line.to_string(),
                    line_number: i + 1,
                    reason,
                });
            }
        }
    }

    debug!(
        dependencies = dependencies.len(),
        skipped, "parsed dependency lines"
    );
    Ok(dependencies)
}

/// Read every line from `reader`, trimming surrounding whitespace.
///
/// Blank and comment lines are kept so line numbers reported by
/// [`parse_all`] match the source.
///
/// # Errors
///
/// Returns any I/O error from the reader, including invalid UTF-8.
pub fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
