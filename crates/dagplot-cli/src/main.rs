#![forbid(unsafe_code)]

mod config;
mod error;
mod output;
mod render;

use std::env;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dagplot_core::{
    Forest, build, count_nodes, layout, parse_all, read_lines, unconsumed_dependencies,
};
use output::{CliError, OutputFormat};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::CliFailure;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dagplot: lay out name>downstream dependency lines as a DAG",
    long_about = None,
    after_help = "EXAMPLES:\n    # Print the forest as an indented tree\n    printf 'a>b\\na>c\\nb>d\\nc>d\\n' | dagplot\n\n    # Write an SVG picture\n    dagplot deps.txt -f svg -o deps.svg"
)]
struct Cli {
    /// Dependency file, one `name` or `name>downstream` per line. Reads stdin when absent.
    input: Option<PathBuf>,

    /// Write the rendering here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (overrides DAGPLOT_FORMAT and the config file).
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (default: ./dagplot.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Fail when any dependency line cannot be placed in the forest.
    #[arg(long)]
    strict: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAGPLOT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dagplot=debug,dagplot_core=debug,info"
        } else {
            "dagplot=info,warn"
        })
    });

    let format = env::var("DAGPLOT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Errors render as JSON only when JSON output was explicitly requested;
    // the config file may be the thing that failed.
    let error_format = output::resolve_output_format(cli.format, None);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = error::error_code_for(&err);
            debug!(%code, summary = code.message(), error = ?err, "command failed");
            if output::render_error(error_format, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let config = config::load_config(cli.config.as_deref(), &cwd)?;
    let format = output::resolve_output_format(cli.format, config.output.format);

    let lines = read_input(cli.input.as_deref())?;
    let forest = load_forest(&lines, cli.strict)?;

    info!(
        nodes = count_nodes(&forest),
        roots = forest.roots().len(),
        ?format,
        "rendering forest"
    );
    write_output(cli.output.as_deref(), |out| {
        render::render(format, &forest, &config.svg, out)
    })
}

/// Parse, build and lay out. Orphans are fatal only under `strict`.
///
/// Library failures surface as [`dagplot_core::Error`] so the error code
/// comes from one place.
fn load_forest(lines: &[String], strict: bool) -> anyhow::Result<Forest> {
    let mut dependencies = parse_all(lines).map_err(dagplot_core::Error::from)?;
    let mut forest = build(&mut dependencies).map_err(dagplot_core::Error::from)?;

    if strict && forest.unconsumed() > 0 {
        let first = unconsumed_dependencies(&dependencies)
            .next()
            .map(|dep| match &dep.downstream {
                Some(downstream) => format!("{}>{downstream}", dep.name),
                None => dep.name.clone(),
            })
            .unwrap_or_default();
        return Err(CliFailure::Orphaned {
            count: forest.unconsumed(),
            first,
        }
        .into());
    }

    layout(&mut forest).map_err(dagplot_core::Error::from)?;
    Ok(forest)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let lines = match path {
        Some(path) => {
            let source_name = path.display().to_string();
            fs::File::open(path)
                .and_then(|file| read_lines(BufReader::new(file)))
                .map_err(|source| CliFailure::ReadInput {
                    source_name,
                    source,
                })?
        }
        None => read_lines(io::stdin().lock()).map_err(|source| CliFailure::ReadInput {
            source_name: "<stdin>".to_string(),
            source,
        })?,
    };
    debug!(lines = lines.len(), "read input");
    Ok(lines)
}

fn write_output(
    path: Option<&Path>,
    emit: impl FnOnce(&mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let target = path.map_or_else(|| "<stdout>".to_string(), |p| p.display().to_string());
    let result = match path {
        Some(path) => fs::File::create(path).and_then(|file| {
            let mut out = BufWriter::new(file);
            emit(&mut out)?;
            out.flush()
        }),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            emit(&mut out).and_then(|()| out.flush())
        }
    };
    result.map_err(|source| CliFailure::WriteOutput { target, source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_input_and_flags_parse() {
        let cli = Cli::parse_from([
            "dagplot", "deps.txt", "-f", "svg", "-o", "out.svg", "--strict", "-v",
        ]);
        assert_eq!(cli.input.as_deref(), Some(Path::new("deps.txt")));
        assert_eq!(cli.format, Some(OutputFormat::Svg));
        assert_eq!(cli.output.as_deref(), Some(Path::new("out.svg")));
        assert!(cli.strict);
        assert!(cli.verbose);
    }

    #[test]
    fn no_arguments_reads_stdin() {
        let cli = Cli::parse_from(["dagplot"]);
        assert!(cli.input.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.strict);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["dagplot", "--format", "png"]).is_err());
    }

    #[test]
    fn strict_rejects_orphans() {
        let lines = vec!["a>b".to_string(), "b>b".to_string()];
        let err = load_forest(&lines, true).expect_err("orphan");
        let failure = err.downcast_ref::<CliFailure>().expect("cli failure");
        assert!(matches!(failure, CliFailure::Orphaned { count: 1, first } if first == "b>b"));
    }

    #[test]
    fn malformed_line_surfaces_as_core_error() {
        let lines = vec!["a>b".to_string(), "a>b>c".to_string()];
        let err = load_forest(&lines, false).expect_err("malformed");
        let core = err
            .downcast_ref::<dagplot_core::Error>()
            .expect("core error");
        assert!(matches!(core, dagplot_core::Error::Parse(parse) if parse.line_number() == 2));
        assert_eq!(error::error_code_for(&err), dagplot_core::ErrorCode::MalformedLine);
    }

    #[test]
    fn cycle_surfaces_as_core_error() {
        let lines = vec!["x>y".to_string(), "y>x".to_string()];
        let err = load_forest(&lines, false).expect_err("cycle");
        assert!(matches!(
            err.downcast_ref::<dagplot_core::Error>(),
            Some(dagplot_core::Error::Graph(_))
        ));
        assert_eq!(error::error_code_for(&err), dagplot_core::ErrorCode::CycleDetected);
    }

    #[test]
    fn lenient_mode_keeps_going() {
        let lines = vec!["a>b".to_string(), "b>b".to_string()];
        let forest = load_forest(&lines, false).expect("forest");
        assert_eq!(forest.unconsumed(), 1);
        assert!(forest.is_positioned());
    }
}
