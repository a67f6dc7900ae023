//! rustcop CLI tool.
//!
//! Usage:
//! ```bash
//! rustcop [OPTIONS] [TARGETS]...
//! ```
//!
//! Exits with 0 when no offences were found, 1 when some were, and 2 on a
//! fatal error.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rustcop_core::{discover, Inspector, ReportMode, RunOptions, RunReport};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod output;

use output::Palette;

/// Source linter for Rust files
#[derive(Parser)]
#[command(name = "rustcop")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Display debug info
    #[arg(short, long)]
    debug: bool,

    /// Display offences in Emacs style
    #[arg(short, long)]
    emacs: bool,

    /// Configuration file, used instead of per-directory lookup
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only show offences, not the summary line
    #[arg(short, long)]
    silent: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Files, directories or glob patterns to inspect (default: current directory)
    targets: Vec<String>,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            mode: if self.emacs {
                ReportMode::Emacs
            } else {
                ReportMode::Default
            },
            debug: self.debug,
            silent: self.silent,
            config: self.config.clone(),
            ..RunOptions::from_env()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(run) => ExitCode::from(u8::try_from(run.exit_status()).unwrap_or(1)),
        Err(err) => {
            eprintln!("rustcop: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let options = cli.run_options();
    let files = discover(cli.targets.as_slice()).context("failed to expand targets")?;

    let inspector = Inspector::builder()
        .registry(rustcop_rules::default_registry())
        .syntax_check(rustcop_rules::syntax_check())
        .options(options)
        .build()
        .context("failed to set up inspection")?;

    let palette = Palette::detect();
    let mode = inspector.options().mode;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if inspector.options().debug {
        output::write_cops_on_duty(&mut out, inspector.registry())?;
    }

    let mut write_error = None;
    let run = inspector.run_with(&files, |report| {
        if write_error.is_none() {
            write_error = output::write_file_report(&mut out, report, mode, &palette).err();
        }
    })?;
    if let Some(err) = write_error {
        return Err(err).context("failed to write report");
    }

    if !inspector.options().silent {
        output::write_summary(&mut out, &run, &palette)?;
    }
    out.flush()?;

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from(["rustcop", "-e", "-s", "-c", "cop.toml", "src"]).unwrap();
        let options = cli.run_options();
        assert_eq!(options.mode, ReportMode::Emacs);
        assert!(options.silent);
        assert!(!options.debug);
        assert_eq!(options.config, Some(PathBuf::from("cop.toml")));
        assert_eq!(cli.targets, ["src"]);
    }

    #[test]
    fn test_default_options() {
        let cli = Cli::try_parse_from(["rustcop"]).unwrap();
        let options = cli.run_options();
        assert_eq!(options.mode, ReportMode::Default);
        assert!(options.config.is_none());
        assert!(cli.targets.is_empty());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["rustcop", "-v"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
