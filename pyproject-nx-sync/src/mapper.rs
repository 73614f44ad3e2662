//! Package name → Nx project name mapping.
//!
//! Python tooling treats `shared-model` and `shared_model` as the same
//! distribution, so a package declared as either spelling must resolve
//! regardless of how other packages refer to it. For every package the table
//! holds the declared name plus its all-hyphen and all-underscore variants.

use crate::descriptor::ProjectDescriptor;
use crate::diagnostics::{Diagnostic, DiagnosticReport, codes};
use crate::manifest;
use crate::scanner::ManifestRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Translation table from declared package names (and spelling variants)
/// to Nx project names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierMapping {
    entries: BTreeMap<String, String>,
}

impl IdentifierMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the Nx project name for a package name as written in a manifest.
    pub fn get(&self, package: &str) -> Option<&str> {
        self.entries.get(package).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `declared` and its spelling variants, all pointing at `project`.
    ///
    /// Later insertions overwrite earlier ones. Returns the keys that
    /// previously pointed at a different project.
    pub fn insert(&mut self, declared: &str, project: &str) -> Vec<(String, String)> {
        let mut conflicts = Vec::new();
        for key in name_variants(declared) {
            if let Some(previous) = self.entries.insert(key.clone(), project.to_string()) {
                if previous != project {
                    conflicts.push((key, previous));
                }
            }
        }
        conflicts
    }
}

/// The declared name followed by its hyphen and underscore spellings,
/// without duplicates.
pub fn name_variants(declared: &str) -> Vec<String> {
    let mut variants = vec![declared.to_string()];
    for variant in [declared.replace('_', "-"), declared.replace('-', "_")] {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

/// How one package fared while building the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MappingOutcome {
    Resolved { declared: String, project: String },
    Skipped { reason: String },
}

/// Build the mapping over every discovered package.
///
/// A package whose `project.json` or `pyproject.toml` is unreadable, invalid,
/// or lacks a name is skipped with a warning; it never aborts the mapping.
/// The returned outcomes are in the same order as `records`.
pub fn build_mapping(
    records: &[ManifestRecord],
    report: &mut DiagnosticReport,
) -> (IdentifierMapping, Vec<MappingOutcome>) {
    let mut mapping = IdentifierMapping::new();
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let outcome = match resolve_names(record) {
            Ok((declared, project)) => {
                for (key, previous) in mapping.insert(&declared, &project) {
                    report.push(
                        Diagnostic::warning(
                            codes::MAPPING_CONFLICT,
                            format!(
                                "Package name \"{key}\" was mapped to \"{previous}\" and is now \
                                 remapped to \"{project}\""
                            ),
                        )
                        .with_package(&record.package_name)
                        .with_file(record.manifest_path.display().to_string())
                        .with_hint("Two packages normalize to the same name; rename one of them."),
                    );
                }
                log::trace!("mapped {declared} -> {project}");
                MappingOutcome::Resolved { declared, project }
            }
            Err(diagnostic) => {
                let reason = diagnostic.message.clone();
                report.push(diagnostic.with_package(&record.package_name));
                MappingOutcome::Skipped { reason }
            }
        };
        outcomes.push(outcome);
    }

    log::debug!(
        "mapping has {} entries from {} packages",
        mapping.len(),
        records.len()
    );
    (mapping, outcomes)
}

/// Read the declared package name and the Nx project name for one record.
fn resolve_names(record: &ManifestRecord) -> Result<(String, String), Diagnostic> {
    let descriptor_file = record.descriptor_path.display().to_string();
    let manifest_file = record.manifest_path.display().to_string();

    let descriptor = ProjectDescriptor::load(&record.descriptor_path).map_err(|err| {
        Diagnostic::warning(codes::INVALID_DESCRIPTOR, err.to_string())
            .with_file(&descriptor_file)
    })?;
    let project = descriptor.name().ok_or_else(|| {
        Diagnostic::warning(
            codes::MISSING_NAME,
            format!("No valid name found in {descriptor_file}"),
        )
        .with_file(&descriptor_file)
        .with_field("name")
    })?;

    let parsed = manifest::load_manifest(&record.manifest_path).map_err(|err| {
        Diagnostic::warning(codes::INVALID_MANIFEST, err.to_string()).with_file(&manifest_file)
    })?;
    let declared = manifest::declared_name(&parsed).ok_or_else(|| {
        Diagnostic::warning(
            codes::MISSING_NAME,
            format!("No valid [project].name found in {manifest_file}"),
        )
        .with_file(&manifest_file)
        .with_field("project.name")
    })?;

    Ok((declared.to_string(), project.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Create `dir/pyproject.toml` and optionally `dir/project.json`, returning the record.
    fn add_package(
        root: &Path,
        dir: &str,
        pyproject: &str,
        project_json: Option<&str>,
    ) -> ManifestRecord {
        let directory = root.join(dir);
        fs::create_dir_all(&directory).unwrap();
        fs::write(directory.join("pyproject.toml"), pyproject).unwrap();
        if let Some(json) = project_json {
            fs::write(directory.join("project.json"), json).unwrap();
        }
        ManifestRecord {
            manifest_path: directory.join("pyproject.toml"),
            descriptor_path: directory.join("project.json"),
            package_name: dir.to_string(),
            directory,
        }
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(name_variants("package-a"), vec!["package-a", "package_a"]);
        assert_eq!(name_variants("shared_model"), vec!["shared_model", "shared-model"]);
        assert_eq!(name_variants("alante"), vec!["alante"]);
        assert_eq!(name_variants("a-b_c"), vec!["a-b_c", "a-b-c", "a_b_c"]);
    }

    #[test]
    fn test_mapping_hyphenated_name() {
        let tmp = TempDir::new().unwrap();
        let records = vec![add_package(
            tmp.path(),
            "package-a",
            "[project]\nname = \"package-a\"",
            Some(r#"{"name": "python-package-a"}"#),
        )];
        let mut report = DiagnosticReport::new();

        let (mapping, outcomes) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("package-a"), Some("python-package-a"));
        assert_eq!(mapping.get("package_a"), Some("python-package-a"));
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            outcomes,
            vec![MappingOutcome::Resolved {
                declared: "package-a".into(),
                project: "python-package-a".into(),
            }]
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_mapping_mixed_conventions() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            add_package(
                tmp.path(),
                "package-a",
                "[project]\nname = \"package-a\"",
                Some(r#"{"name": "python-package-a"}"#),
            ),
            add_package(
                tmp.path(),
                "shared-model",
                "[project]\nname = \"shared_model\"",
                Some(r#"{"name": "python-shared-model"}"#),
            ),
        ];
        let mut report = DiagnosticReport::new();

        let (mapping, _) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("package_a"), Some("python-package-a"));
        assert_eq!(mapping.get("shared_model"), Some("python-shared-model"));
        assert_eq!(mapping.get("shared-model"), Some("python-shared-model"));
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_mapping_plain_name_has_single_entry() {
        let tmp = TempDir::new().unwrap();
        let records = vec![add_package(
            tmp.path(),
            "alante",
            "[project]\nname = \"alante\"",
            Some(r#"{"name": "python-alante"}"#),
        )];
        let mut report = DiagnosticReport::new();

        let (mapping, _) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("alante"), Some("python-alante"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_mapping_uses_declared_name_not_directory() {
        let tmp = TempDir::new().unwrap();
        let records = vec![add_package(
            tmp.path(),
            "some-dir",
            "[project]\nname = \"real-name\"",
            Some(r#"{"name": "python-real-name"}"#),
        )];
        let mut report = DiagnosticReport::new();

        let (mapping, _) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("real-name"), Some("python-real-name"));
        assert_eq!(mapping.get("some-dir"), None);
    }

    #[test]
    fn test_mapping_skips_invalid_descriptor_name() {
        let tmp = TempDir::new().unwrap();
        let records = vec![add_package(
            tmp.path(),
            "package-a",
            "[project]\nname = \"package-a\"",
            Some(r#"{"targets": {}}"#),
        )];
        let mut report = DiagnosticReport::new();

        let (mapping, outcomes) = build_mapping(&records, &mut report);

        assert!(mapping.is_empty());
        assert!(matches!(outcomes[0], MappingOutcome::Skipped { .. }));
        let diag = report.with_code(codes::MISSING_NAME).next().unwrap();
        assert_eq!(diag.field.as_deref(), Some("name"));
        assert_eq!(diag.package.as_deref(), Some("package-a"));
    }

    #[test]
    fn test_mapping_skips_invalid_manifest_name() {
        let tmp = TempDir::new().unwrap();
        let records = vec![add_package(
            tmp.path(),
            "package-a",
            "[tool.uv]\ndev-dependencies = []",
            Some(r#"{"name": "python-package-a"}"#),
        )];
        let mut report = DiagnosticReport::new();

        let (mapping, _) = build_mapping(&records, &mut report);

        assert!(mapping.is_empty());
        let diag = report.with_code(codes::MISSING_NAME).next().unwrap();
        assert_eq!(diag.field.as_deref(), Some("project.name"));
    }

    #[test]
    fn test_mapping_bad_package_does_not_abort_others() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            add_package(tmp.path(), "broken", "[project\n", Some(r#"{"name": "python-broken"}"#)),
            add_package(tmp.path(), "orphan", "[project]\nname = \"orphan\"", None),
            add_package(
                tmp.path(),
                "package-b",
                "[project]\nname = \"package-b\"",
                Some(r#"{"name": "python-package-b"}"#),
            ),
        ];
        let mut report = DiagnosticReport::new();

        let (mapping, outcomes) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("package-b"), Some("python-package-b"));
        assert_eq!(mapping.get("broken"), None);
        assert_eq!(mapping.get("orphan"), None);
        assert_eq!(report.with_code(codes::INVALID_MANIFEST).count(), 1);
        assert_eq!(report.with_code(codes::INVALID_DESCRIPTOR).count(), 1);
        assert!(!report.has_errors());
        assert!(matches!(outcomes[2], MappingOutcome::Resolved { .. }));
    }

    #[test]
    fn test_mapping_collision_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            add_package(
                tmp.path(),
                "foo-bar",
                "[project]\nname = \"foo-bar\"",
                Some(r#"{"name": "python-foo-bar"}"#),
            ),
            add_package(
                tmp.path(),
                "foo_bar",
                "[project]\nname = \"foo_bar\"",
                Some(r#"{"name": "python-foo-bar-2"}"#),
            ),
        ];
        let mut report = DiagnosticReport::new();

        let (mapping, _) = build_mapping(&records, &mut report);

        assert_eq!(mapping.get("foo-bar"), Some("python-foo-bar-2"));
        assert_eq!(mapping.get("foo_bar"), Some("python-foo-bar-2"));
        assert_eq!(report.with_code(codes::MAPPING_CONFLICT).count(), 2);
    }
}
