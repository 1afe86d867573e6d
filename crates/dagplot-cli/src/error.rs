//! Failures owned by the binary, plus mapping of any error chain to an
//! [`ErrorCode`].

use std::io;
use std::path::PathBuf;

use dagplot_core::{ErrorCode, GraphError, ParseError};

#[derive(Debug, thiserror::Error)]
pub enum CliFailure {
    #[error("failed to read input {source_name}")]
    ReadInput {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output {target}")]
    WriteOutput {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read config {}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Raised only under `--strict`.
    #[error("{count} dependency line(s) were never placed in the forest, first: {first}")]
    Orphaned { count: usize, first: String },
}

impl CliFailure {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ReadInput { .. } => ErrorCode::InputUnreadable,
            Self::WriteOutput { .. } => ErrorCode::OutputUnwritable,
            Self::ReadConfig { .. } | Self::ParseConfig { .. } => ErrorCode::ConfigParseError,
            Self::Orphaned { .. } => ErrorCode::OrphanedDependency,
        }
    }
}

/// Walk the error chain and return the first recognised code.
#[must_use]
pub fn error_code_for(err: &anyhow::Error) -> ErrorCode {
    for cause in err.chain() {
        if let Some(failure) = cause.downcast_ref::<CliFailure>() {
            return failure.code();
        }
        if let Some(core) = cause.downcast_ref::<dagplot_core::Error>() {
            return core.code();
        }
        if cause.is::<ParseError>() {
            return ErrorCode::MalformedLine;
        }
        if cause.is::<GraphError>() {
            return ErrorCode::CycleDetected;
        }
    }
    ErrorCode::InternalUnexpected
}
