//! pyproject-nx-sync: keep Nx `implicitDependencies` in sync with uv
//! workspace dependencies.
//!
//! Scans a directory tree for `pyproject.toml` files, reads the
//! `[tool.uv.sources]` entries marked `workspace = true`, translates them to
//! Nx project names via each package's sibling `project.json`, and rewrites
//! `implicitDependencies` where it differs.
//!
//! # Exit codes
//!
//! - 0: Success (per-package warnings are allowed)
//! - 1: `--check` found outdated descriptors
//! - 2: Fatal error (missing root directory, unreadable root, etc.)

mod config;
mod descriptor;
mod diagnostics;
mod error;
mod manifest;
mod mapper;
mod output;
mod scanner;
mod sync;

use anyhow::{Context, Result};
use clap::Parser;
use config::SyncOptions;
use diagnostics::OutputFormat;
use std::path::PathBuf;

/// Sync Nx implicitDependencies with uv workspace dependencies.
///
/// Every pyproject.toml under ROOT is read for `[tool.uv.sources]` entries
/// with `workspace = true`; the matching project.json gets those packages'
/// Nx project names as its sorted `implicitDependencies`.
#[derive(Debug, Parser)]
#[command(name = "pyproject-nx-sync", version, about, long_about = None)]
struct Cli {
    /// Workspace root to scan.
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// Report outdated project.json files without writing them.
    ///
    /// Exits with code 1 when any descriptor is out of date.
    #[arg(long)]
    check: bool,

    /// Additional directory names to skip while scanning.
    #[arg(
        long,
        value_name = "NAME",
        env = "PYPROJECT_NX_SYNC_EXCLUDE",
        value_delimiter = ','
    )]
    exclude: Vec<String>,

    /// Output format for diagnostics and per-package results.
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            exclude: self.exclude.clone(),
            check: self.check,
            ..Default::default()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();

    if cli.format == OutputFormat::Human {
        eprintln!("Starting sync from: {}", cli.root.display());
    }

    let summary = sync::sync_workspace(&cli.root, &options)
        .with_context(|| format!("Failed to sync {}", cli.root.display()))?;

    output::print_summary(&summary, cli.format, options.check)?;

    if options.check && summary.outdated_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// A fatal error as a one-diagnostic JSON report.
fn fatal_json(err: &anyhow::Error) -> String {
    let mut report = diagnostics::DiagnosticReport::new();
    report.push(diagnostics::Diagnostic::error(
        diagnostics::codes::FATAL,
        format!("{err:#}"),
    ));
    report.format_json().unwrap_or_else(|_| {
        serde_json::json!({
            "diagnostics": [{
                "code": diagnostics::codes::FATAL,
                "severity": "error",
                "message": format!("{err:#}"),
            }]
        })
        .to_string()
    })
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        match cli.format {
            OutputFormat::Json => eprintln!("{}", fatal_json(&err)),
            OutputFormat::Human => {
                use owo_colors::OwoColorize;
                eprintln!("{} {err:#}", "error:".red().bold());
            }
        }

        std::process::exit(2);
    }
}
