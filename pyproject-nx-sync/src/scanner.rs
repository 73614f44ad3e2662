//! Manifest discovery.
//!
//! Walks the workspace tree and yields one [`ManifestRecord`] per
//! `pyproject.toml`, skipping virtualenvs, caches, `node_modules` and hidden
//! directories. Entries are visited in file-name order so the result is
//! stable for a given filesystem state.

use crate::config::SyncOptions;
use crate::diagnostics::{Diagnostic, DiagnosticReport, codes};
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A discovered Python package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRecord {
    /// Absolute path to `pyproject.toml`.
    pub manifest_path: PathBuf,

    /// Directory containing the manifest.
    pub directory: PathBuf,

    /// Absolute path to the sibling `project.json` (may not exist).
    pub descriptor_path: PathBuf,

    /// Base name of `directory`. Not necessarily the declared `[project].name`.
    pub package_name: String,
}

impl ManifestRecord {
    fn from_manifest(manifest_path: PathBuf, descriptor_file: &str) -> Self {
        let directory = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let package_name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let descriptor_path = directory.join(descriptor_file);

        Self {
            manifest_path,
            directory,
            descriptor_path,
            package_name,
        }
    }
}

/// Scan `root` recursively for package manifests.
///
/// Fails only when the root itself cannot be traversed. Unreadable
/// subdirectories are reported as warnings and skipped.
pub fn scan_manifests(
    root: &Path,
    options: &SyncOptions,
    report: &mut DiagnosticReport,
) -> Result<Vec<ManifestRecord>> {
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, options));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(Error::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                report.push(
                    Diagnostic::warning(codes::WALK_ERROR, format!("Skipping {path}: {err}"))
                        .with_file(path),
                );
                continue;
            }
        };

        // A symlinked manifest counts; symlinked directories are not followed.
        if entry.file_name() != options.manifest_file.as_str() || !entry.path().is_file() {
            continue;
        }

        log::trace!("found manifest {}", entry.path().display());
        records.push(ManifestRecord::from_manifest(
            entry.into_path(),
            &options.descriptor_file,
        ));
    }

    log::debug!("discovered {} manifests under {}", records.len(), root.display());
    Ok(records)
}

/// Whether the walk should not descend into this entry.
///
/// The root itself is never pruned, even if its name is hidden.
fn is_pruned(entry: &DirEntry, options: &SyncOptions) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| options.is_skipped_dir(name))
}
