//! The sync pipeline: scan → map → (extract → translate → update) per package.
//!
//! Only an invalid root is fatal. Every per-package failure becomes a
//! diagnostic plus a [`PackageOutcome::Skipped`] and the loop moves on.

use crate::config::SyncOptions;
use crate::descriptor::{self, UpdateOutcome};
use crate::diagnostics::{Diagnostic, DiagnosticReport, codes};
use crate::error::{Error, Result};
use crate::manifest;
use crate::mapper::{self, IdentifierMapping, MappingOutcome};
use crate::scanner::{self, ManifestRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What happened to one package's `project.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PackageOutcome {
    /// `implicitDependencies` was rewritten.
    Updated { dependencies: Vec<String> },
    /// Already in sync; nothing written.
    Unchanged,
    /// Check mode only: the descriptor differs from `dependencies`.
    Outdated { dependencies: Vec<String> },
    /// The package could not be processed; its descriptor is untouched.
    Skipped { reason: String },
}

/// Per-package line of a [`SyncSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub package: String,
    /// Nx project name, when the package made it into the mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub descriptor: PathBuf,
    #[serde(flatten)]
    pub outcome: PackageOutcome,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub root: PathBuf,
    pub packages: Vec<PackageReport>,
    #[serde(flatten)]
    pub report: DiagnosticReport,
}

impl SyncSummary {
    fn count(&self, pred: impl Fn(&PackageOutcome) -> bool) -> usize {
        self.packages.iter().filter(|p| pred(&p.outcome)).count()
    }

    pub fn updated_count(&self) -> usize {
        self.count(|o| matches!(o, PackageOutcome::Updated { .. }))
    }

    pub fn unchanged_count(&self) -> usize {
        self.count(|o| matches!(o, PackageOutcome::Unchanged))
    }

    pub fn outdated_count(&self) -> usize {
        self.count(|o| matches!(o, PackageOutcome::Outdated { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, PackageOutcome::Skipped { .. }))
    }

    /// Outcome for the package in the given directory name, if it was discovered.
    #[cfg(test)]
    pub fn outcome(&self, package: &str) -> Option<&PackageOutcome> {
        self.packages
            .iter()
            .find(|p| p.package == package)
            .map(|p| &p.outcome)
    }
}

/// Resolve `input` against the current directory and make sure it exists.
pub fn resolve_root(input: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(input).map_err(|e| Error::io(input, e))?;
    if !absolute.exists() {
        return Err(Error::RootNotFound { path: absolute });
    }
    Ok(absolute)
}

/// Synchronize every `project.json` under `root` with its package's
/// workspace dependencies.
pub fn sync_workspace(root: &Path, options: &SyncOptions) -> Result<SyncSummary> {
    let root = resolve_root(root)?;
    let mut report = DiagnosticReport::new();

    let records = scanner::scan_manifests(&root, options, &mut report)?;
    let (mapping, resolved) = mapper::build_mapping(&records, &mut report);

    let packages = records
        .iter()
        .zip(resolved)
        .map(|(record, resolved)| PackageReport {
            package: record.package_name.clone(),
            project: match resolved {
                MappingOutcome::Resolved { project, .. } => Some(project),
                MappingOutcome::Skipped { .. } => None,
            },
            descriptor: record.descriptor_path.clone(),
            outcome: sync_package(record, &mapping, options, &mut report),
        })
        .collect();

    Ok(SyncSummary {
        root,
        packages,
        report,
    })
}

/// Process one package. Never fails; problems are pushed into `report`.
fn sync_package(
    record: &ManifestRecord,
    mapping: &IdentifierMapping,
    options: &SyncOptions,
    report: &mut DiagnosticReport,
) -> PackageOutcome {
    let manifest_file = record.manifest_path.display().to_string();
    let descriptor_file = record.descriptor_path.display().to_string();

    let workspace_packages = match manifest::extract_workspace_dependencies(&record.manifest_path)
    {
        Ok(deps) => deps,
        Err(err) => {
            let reason = err.to_string();
            report.push(
                Diagnostic::error(codes::INVALID_MANIFEST, reason.clone())
                    .with_package(&record.package_name)
                    .with_file(&manifest_file),
            );
            return PackageOutcome::Skipped { reason };
        }
    };

    let dependencies = translate(&workspace_packages, mapping, record, report);

    if !record.descriptor_path.is_file() {
        report.push(
            Diagnostic::warning(
                codes::MISSING_DESCRIPTOR,
                format!(
                    "{} not found at {descriptor_file}, skipping",
                    options.descriptor_file
                ),
            )
            .with_package(&record.package_name)
            .with_file(&descriptor_file),
        );
        return PackageOutcome::Skipped {
            reason: format!("missing {}", options.descriptor_file),
        };
    }

    let result = if options.check {
        descriptor::check_project_json(&record.descriptor_path, &dependencies)
    } else {
        descriptor::update_project_json(&record.descriptor_path, &dependencies)
    };

    match result {
        Ok(UpdateOutcome::Unchanged) => PackageOutcome::Unchanged,
        Ok(UpdateOutcome::Changed) if options.check => {
            report.push(
                Diagnostic::info(
                    codes::OUTDATED_DESCRIPTOR,
                    format!("implicitDependencies would change to {dependencies:?}"),
                )
                .with_package(&record.package_name)
                .with_file(&descriptor_file)
                .with_field("implicitDependencies"),
            );
            PackageOutcome::Outdated { dependencies }
        }
        Ok(UpdateOutcome::Changed) => PackageOutcome::Updated { dependencies },
        Err(err) => {
            let reason = err.to_string();
            report.push(
                Diagnostic::error(codes::UPDATE_FAILED, reason.clone())
                    .with_package(&record.package_name)
                    .with_file(&descriptor_file),
            );
            PackageOutcome::Skipped { reason }
        }
    }
}

/// Translate package names to Nx project names, sorted and deduplicated.
///
/// Names missing from the mapping are dropped with a warning.
fn translate(
    workspace_packages: &[String],
    mapping: &IdentifierMapping,
    record: &ManifestRecord,
    report: &mut DiagnosticReport,
) -> Vec<String> {
    let mut projects = BTreeSet::new();

    for package in workspace_packages {
        match mapping.get(package) {
            Some(project) => {
                projects.insert(project.to_string());
            }
            None => report.push(
                Diagnostic::warning(
                    codes::UNRESOLVED_DEPENDENCY,
                    format!(
                        "Package \"{package}\" not found in mapping table (referenced in {})",
                        record.manifest_path.display()
                    ),
                )
                .with_package(&record.package_name)
                .with_file(record.manifest_path.display().to_string())
                .with_field(format!("tool.uv.sources.{package}"))
                .with_hint(format!(
                    "Make sure \"{package}\" has a pyproject.toml with [project].name and a \
                     project.json with a name"
                )),
            ),
        }
    }

    projects.into_iter().collect()
}
