//! Error taxonomy for parsing and graph construction.
//!
//! - [`LineError`] describes why a single line is malformed.
//! - [`ParseError`] attaches the offending line and its 1-based position.
//! - [`GraphError`] is raised by the builder and the layout engine.
//! - [`Error`] wraps both for callers that run the whole pipeline.
//!
//! Every error maps to a stable [`ErrorCode`] so front-ends can emit
//! machine-readable failures.

use std::fmt;

/// Why a single dependency line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// More than one `>` separator on the line.
    #[error("expected at most one '>' separator, found {count}")]
    MultipleSeparators {
        /// Number of separators found.
        count: usize,
    },
    /// Nothing before the separator.
    #[error("missing node name before '>'")]
    EmptyName,
    /// A separator with nothing after it.
    #[error("missing downstream name after '>'")]
    EmptyDownstream,
}

/// A line-specific parse failure. Aborts processing of the whole input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("could not parse line {line_number} \"{line}\": {reason}")]
    MalformedLine {
        /// The offending line as given.
        line: String,
        /// 1-based position of the line in the input sequence.
        line_number: usize,
        reason: LineError,
    },
}

impl ParseError {
    /// 1-based line number of the failure.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::MalformedLine { line_number, .. } => *line_number,
        }
    }
}

/// Failures raised while building or positioning a forest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Expansion would revisit a name already on the current path.
    ///
    /// From the builder, `path` starts at the first occurrence of
    /// `repeated_name` and ends with it again, e.g. `["a", "b", "c", "a"]`.
    /// From [`crate::layout::layout`] it is the single node `[repeated_name]`.
    #[error("cycle detected at '{repeated_name}': {}", .path.join(" → "))]
    Cycle {
        repeated_name: String,
        path: Vec<String>,
    },
}

/// Umbrella error for the full parse → build → layout pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl Error {
    /// The stable machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::MalformedLine,
            Self::Graph(GraphError::Cycle { .. }) => ErrorCode::CycleDetected,
        }
    }
}

/// Machine-readable error codes for front-ends and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedLine,
    ConfigParseError,
    CycleDetected,
    OrphanedDependency,
    InputUnreadable,
    OutputUnwritable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedLine => "E1001",
            Self::ConfigParseError => "E1002",
            Self::CycleDetected => "E2001",
            Self::OrphanedDependency => "E2002",
            Self::InputUnreadable => "E5001",
            Self::OutputUnwritable => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedLine => "Malformed dependency line",
            Self::ConfigParseError => "Config file parse error",
            Self::CycleDetected => "Dependency cycle detected",
            Self::OrphanedDependency => "Dependency was never placed in the forest",
            Self::InputUnreadable => "Input could not be read",
            Self::OutputUnwritable => "Output could not be written",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedLine => Some("Use `name` or `name>downstream`, one '>' per line."),
            Self::ConfigParseError => Some("Fix syntax in dagplot.toml and retry."),
            Self::CycleDetected => Some("Remove one of the listed edges to keep the graph acyclic."),
            Self::OrphanedDependency => Some("Remove self-referencing lines such as `a>a`."),
            Self::InputUnreadable => Some("Check the input path and its permissions."),
            Self::OutputUnwritable => Some("Check that the output directory exists and is writable."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
