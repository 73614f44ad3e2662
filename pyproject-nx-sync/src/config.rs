//! Run configuration.

/// File name of the Python package manifest.
pub const MANIFEST_FILE: &str = "pyproject.toml";

/// File name of the Nx project descriptor, a sibling of the manifest.
pub const DESCRIPTOR_FILE: &str = "project.json";

/// Directories that never contain workspace members.
///
/// Hidden directories (`.venv`, `.git`, ...) are skipped separately.
pub const SKIP_DIRS: &[&str] = &["node_modules", ".venv", "venv", "__pycache__"];

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Manifest file name to look for.
    pub manifest_file: String,

    /// Descriptor file name expected next to each manifest.
    pub descriptor_file: String,

    /// Extra directory names to skip during the scan.
    pub exclude: Vec<String>,

    /// Report outdated descriptors without writing them.
    pub check: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            manifest_file: MANIFEST_FILE.to_string(),
            descriptor_file: DESCRIPTOR_FILE.to_string(),
            exclude: Vec::new(),
            check: false,
        }
    }
}

impl SyncOptions {
    /// Whether a directory with this name is pruned from the scan.
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        name.starts_with('.')
            || SKIP_DIRS.contains(&name)
            || self.exclude.iter().any(|e| e == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conventions() {
        let options = SyncOptions::default();
        assert_eq!(options.manifest_file, "pyproject.toml");
        assert_eq!(options.descriptor_file, "project.json");
        assert!(!options.check);
    }

    #[test]
    fn test_skipped_dirs() {
        let options = SyncOptions {
            exclude: vec!["dist".into()],
            ..Default::default()
        };
        assert!(options.is_skipped_dir("node_modules"));
        assert!(options.is_skipped_dir(".venv"));
        assert!(options.is_skipped_dir("venv"));
        assert!(options.is_skipped_dir("__pycache__"));
        assert!(options.is_skipped_dir(".git"));
        assert!(options.is_skipped_dir("dist"));
        assert!(!options.is_skipped_dir("package-a"));
    }
}
