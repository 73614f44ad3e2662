//! Rendering a [`SyncSummary`] for the terminal or as JSON.

use crate::diagnostics::OutputFormat;
use crate::sync::{PackageOutcome, SyncSummary};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Print the run summary in the requested format.
pub fn print_summary(summary: &SyncSummary, format: OutputFormat, check: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(summary)
                    .context("Failed to serialize sync summary as JSON")?
            );
        }
        OutputFormat::Human => print_human(summary, check),
    }
    Ok(())
}

fn print_human(summary: &SyncSummary, check: bool) {
    for package in &summary.packages {
        match &package.outcome {
            PackageOutcome::Updated { dependencies } => {
                println!(
                    "  {} {} {}",
                    "updated".green().bold(),
                    package.package.bold(),
                    format_list(dependencies).dimmed()
                );
            }
            PackageOutcome::Outdated { dependencies } => {
                println!(
                    "  {} {} {}",
                    "outdated".yellow().bold(),
                    package.package.bold(),
                    format_list(dependencies).dimmed()
                );
            }
            PackageOutcome::Unchanged | PackageOutcome::Skipped { .. } => {}
        }
    }

    if !summary.report.is_empty() {
        eprint!("{}", summary.report.format_human());
    }

    let total = summary.packages.len();
    let detail = if check {
        format!(
            "Checked {total} {}: {} outdated, {} up to date, {} skipped",
            plural(total),
            summary.outdated_count(),
            summary.unchanged_count(),
            summary.skipped_count()
        )
    } else {
        format!(
            "Synced {total} {}: {} updated, {} unchanged, {} skipped",
            plural(total),
            summary.updated_count(),
            summary.unchanged_count(),
            summary.skipped_count()
        )
    };

    let mark = if check && summary.outdated_count() > 0 {
        "✗".red().bold().to_string()
    } else if summary.report.has_errors() {
        "⚠".yellow().bold().to_string()
    } else {
        "✓".green().bold().to_string()
    };
    eprintln!("{mark} {detail} ({})", summary.root.display().dimmed());
}

fn format_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "package" } else { "packages" }
}
