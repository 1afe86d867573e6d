//! Output format selection and error rendering.
//!
//! # Format resolution
//!
//! Precedence (highest wins):
//! 1. `--format`
//! 2. `DAGPLOT_FORMAT` env var → `"tree"` | `"json"` | `"svg"`
//! 3. `[output] format` from the config file
//! 4. Default: [`OutputFormat::Tree`]

use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::error_code_for;

/// Renderings of a laid-out forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text, one node per line.
    #[default]
    Tree,
    /// Machine-readable JSON document.
    Json,
    /// Scalable vector graphic of boxes and arrows.
    Svg,
}

impl OutputFormat {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "tree" => Some(Self::Tree),
            "json" => Some(Self::Json),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

fn resolve_output_format_inner(
    format_flag: Option<OutputFormat>,
    format_env: Option<&str>,
    config_format: Option<OutputFormat>,
) -> OutputFormat {
    if let Some(format) = format_flag {
        return format;
    }

    // Unknown env values fall through to the config file.
    if let Some(format) = format_env.and_then(OutputFormat::from_env_value) {
        return format;
    }

    config_format.unwrap_or_default()
}

/// Resolve the output format from the flag, `DAGPLOT_FORMAT`, and config.
#[must_use]
pub fn resolve_output_format(
    format_flag: Option<OutputFormat>,
    config_format: Option<OutputFormat>,
) -> OutputFormat {
    let env_val = std::env::var("DAGPLOT_FORMAT").ok();
    resolve_output_format_inner(format_flag, env_val.as_deref(), config_format)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable code such as `E2001`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = error_code_for(err);
        Self {
            message: format!("{err:#}"),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render an error to `out`: a JSON object when `format` is JSON, plain
/// text otherwise.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_error(out: &mut dyn Write, format: OutputFormat, error: &CliError) -> io::Result<()> {
    if format.is_json() {
        let wrapper = serde_json::json!({ "error": error });
        serde_json::to_writer_pretty(&mut *out, &wrapper)?;
        writeln!(out)?;
    } else {
        match &error.error_code {
            Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
            None => writeln!(out, "error: {}", error.message)?,
        }
        if let Some(suggestion) = &error.suggestion {
            writeln!(out, "  suggestion: {suggestion}")?;
        }
    }
    Ok(())
}

/// Render an error to stderr.
///
/// # Errors
///
/// Propagates write failures.
pub fn render_error(format: OutputFormat, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, format, error)
}
