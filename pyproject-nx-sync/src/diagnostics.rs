//! Structured diagnostics for pyproject-nx-sync.
//!
//! Every stage of the pipeline reports recoverable problems by pushing a
//! [`Diagnostic`] into a shared [`DiagnosticReport`] instead of printing to
//! the console. The binary renders the report at the end of the run.
//!
//! Code ranges:
//! - PS1xx: discovery (walk errors, missing `project.json`)
//! - PS2xx: manifest and descriptor contents
//! - PS3xx: identifier mapping
//! - PS4xx: descriptor updates
//! - PS5xx: fatal errors

use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    fn paint(self) -> String {
        match self {
            Self::Error => "error".red().bold().to_string(),
            Self::Warning => "warning".yellow().bold().to_string(),
            Self::Info => "info".blue().bold().to_string(),
        }
    }
}

/// One problem found while syncing, tied to a package and file where known.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// PS code, e.g. `"PS201"`.
    pub code: &'static str,
    pub severity: Severity,
    /// Package directory name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Dotted key inside `file`, e.g. `project.name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    fn new(code: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            package: None,
            file: None,
            field: None,
            message: message.into(),
            hint: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render for the terminal:
    ///
    /// ```text
    /// warning[PS300]: Package "package-x" not found in mapping table
    ///   --> python/package-a/pyproject.toml
    ///   = package: package-a
    ///   = hint: add a project.json next to package-x's pyproject.toml
    /// ```
    pub fn format_human(&self) -> String {
        let mut out = format!("{}[{}]: {}\n", self.severity.paint(), self.code.bold(), self.message);
        if let Some(file) = &self.file {
            out.push_str(&format!("  {} {}\n", "-->".blue().bold(), file.bold()));
        }
        let notes = [
            ("package", &self.package),
            ("field", &self.field),
            ("hint", &self.hint),
        ];
        for (label, value) in notes {
            if let Some(value) = value {
                out.push_str(&format!("  {} {}: {value}\n", "=".blue().bold(), label.dimmed()));
            }
        }
        out
    }
}

/// Diagnostics gathered over one run, in the order they were pushed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("[{}] {}", diagnostic.code, diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    #[cfg(test)]
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn format_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every diagnostic followed by a tally such as `1 error, 2 warnings`.
    /// Info diagnostics are listed but not tallied.
    pub fn format_human(&self) -> String {
        let mut out: String = self
            .diagnostics
            .iter()
            .map(|d| d.format_human() + "\n")
            .collect();

        let mut tally = Vec::new();
        match self.count(Severity::Error) {
            0 => {}
            1 => tally.push("1 error".red().bold().to_string()),
            n => tally.push(format!("{n} errors").red().bold().to_string()),
        }
        match self.count(Severity::Warning) {
            0 => {}
            1 => tally.push("1 warning".yellow().bold().to_string()),
            n => tally.push(format!("{n} warnings").yellow().bold().to_string()),
        }
        if !tally.is_empty() {
            out.push_str(&tally.join(", "));
            out.push('\n');
        }
        out
    }
}

// ── Output format ─────────────────────────────────────────────────

/// The output format for diagnostics (set via `--format`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored terminal output.
    #[default]
    Human,
    /// JSON containing per-package outcomes and diagnostics.
    Json,
}

// ── Well-known diagnostic codes ───────────────────────────────────

/// Well-known PS diagnostic codes.
pub mod codes {
    // Discovery (PS1xx)
    pub const WALK_ERROR: &str = "PS100";
    pub const MISSING_DESCRIPTOR: &str = "PS101";

    // Manifest / descriptor contents (PS2xx)
    pub const INVALID_MANIFEST: &str = "PS200";
    pub const INVALID_DESCRIPTOR: &str = "PS201";
    pub const MISSING_NAME: &str = "PS202";

    // Identifier mapping (PS3xx)
    pub const UNRESOLVED_DEPENDENCY: &str = "PS300";
    pub const MAPPING_CONFLICT: &str = "PS301";

    // Updates (PS4xx)
    pub const UPDATE_FAILED: &str = "PS400";
    pub const OUTDATED_DESCRIPTOR: &str = "PS401";

    // CLI (PS5xx)
    pub const FATAL: &str = "PS500";
}
