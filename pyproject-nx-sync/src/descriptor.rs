//! Nx `project.json` reading and rewriting.
//!
//! Descriptors are handled as untyped JSON so every field other than
//! `implicitDependencies` survives a rewrite unchanged, in its original
//! order.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

const IMPLICIT_DEPENDENCIES: &str = "implicitDependencies";

/// Result of reconciling a descriptor with its desired dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The descriptor was (or, in check mode, would be) rewritten.
    Changed,
    /// The descriptor already lists exactly the desired dependencies.
    Unchanged,
}

/// An Nx project descriptor loaded from disk.
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl ProjectDescriptor {
    /// Read and parse a descriptor.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let value: Value = serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(fields) => Ok(Self {
                path: path.to_path_buf(),
                fields,
            }),
            _ => Err(Error::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The Nx project name, if it is a non-empty string.
    pub fn name(&self) -> Option<&str> {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Whether `implicitDependencies` already equals `sorted`, element by element.
    ///
    /// An absent or `null` field counts as an empty list. Any other non-array
    /// value differs.
    pub fn has_implicit_dependencies(&self, sorted: &[String]) -> bool {
        match self.fields.get(IMPLICIT_DEPENDENCIES) {
            None | Some(Value::Null) => sorted.is_empty(),
            Some(Value::Array(existing)) => {
                existing.len() == sorted.len()
                    && existing
                        .iter()
                        .zip(sorted)
                        .all(|(have, want)| have.as_str() == Some(want.as_str()))
            }
            Some(_) => false,
        }
    }

    /// Replace `implicitDependencies`, keeping its position if it already exists.
    pub fn set_implicit_dependencies(&mut self, sorted: &[String]) {
        let value = Value::Array(sorted.iter().cloned().map(Value::String).collect());
        self.fields.insert(IMPLICIT_DEPENDENCIES.to_string(), value);
    }

    /// Serialize with two-space indentation and a single trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.fields).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        out.push('\n');
        Ok(out)
    }

    /// Write the descriptor back in place.
    ///
    /// The new content goes to a temporary file in the same directory which
    /// then replaces the original.
    pub fn save(&self) -> Result<()> {
        let content = self.to_pretty_string()?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        // Keep the original file mode; temp files are created 0600.
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| Error::io(tmp.path(), e))?;
        }
        tmp.write_all(content.as_bytes())
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&self.path).map_err(|source| Error::Persist {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Sort dependencies ascending by byte-wise string comparison.
fn sorted(dependencies: &[String]) -> Vec<String> {
    let mut sorted = dependencies.to_vec();
    sorted.sort();
    sorted
}

/// Rewrite `implicitDependencies` in `path` to the sorted `dependencies`.
///
/// Nothing is written when the descriptor already matches, so calling this
/// twice with the same input writes at most once.
pub fn update_project_json(path: &Path, dependencies: &[String]) -> Result<UpdateOutcome> {
    let mut descriptor = ProjectDescriptor::load(path)?;
    let sorted = sorted(dependencies);

    if descriptor.has_implicit_dependencies(&sorted) {
        log::trace!("{} is up to date", path.display());
        return Ok(UpdateOutcome::Unchanged);
    }

    descriptor.set_implicit_dependencies(&sorted);
    descriptor.save()?;
    log::debug!("updated {} -> {:?}", path.display(), sorted);
    Ok(UpdateOutcome::Changed)
}

/// Like [`update_project_json`], but never writes.
pub fn check_project_json(path: &Path, dependencies: &[String]) -> Result<UpdateOutcome> {
    let descriptor = ProjectDescriptor::load(path)?;
    if descriptor.has_implicit_dependencies(&sorted(dependencies)) {
        Ok(UpdateOutcome::Unchanged)
    } else {
        Ok(UpdateOutcome::Changed)
    }
}
