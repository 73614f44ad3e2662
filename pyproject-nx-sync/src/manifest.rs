//! `pyproject.toml` reading.
//!
//! Only two things are ever read from a manifest: the declared
//! `[project].name` and the `[tool.uv.sources]` entries flagged with
//! `workspace = true`.

use crate::error::{Error, Result};
use std::path::Path;

/// Read and parse a manifest into a TOML table.
pub fn load_manifest(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    content.parse::<toml::Table>().map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract the names of workspace dependencies declared in a manifest.
///
/// A missing or malformed `[tool.uv.sources]` section yields an empty list.
/// Only an unreadable or unparseable file is an error.
pub fn extract_workspace_dependencies(path: &Path) -> Result<Vec<String>> {
    let manifest = load_manifest(path)?;
    Ok(workspace_dependencies(&manifest))
}

/// Keys of `[tool.uv.sources]` whose entry has `workspace = true`, in source order.
pub fn workspace_dependencies(manifest: &toml::Table) -> Vec<String> {
    let Some(sources) = manifest
        .get("tool")
        .and_then(|v| v.get("uv"))
        .and_then(|v| v.get("sources"))
        .and_then(|v| v.as_table())
    else {
        return Vec::new();
    };

    sources
        .iter()
        .filter(|(_, config)| {
            config
                .as_table()
                .and_then(|t| t.get("workspace"))
                .and_then(|w| w.as_bool())
                .unwrap_or(false)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// The declared `[project].name`, if it is a non-empty string.
pub fn declared_name(manifest: &toml::Table) -> Option<&str> {
    manifest
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
}
