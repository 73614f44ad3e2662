//! Error types for the sync pipeline.

use std::io;
use std::path::PathBuf;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning, parsing or rewriting workspace files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workspace root does not exist.
    #[error("Root directory does not exist: {}", .path.display())]
    RootNotFound { path: PathBuf },

    /// A file could not be read or written.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `pyproject.toml` could not be parsed.
    #[error("Failed to parse '{}': {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `project.json` could not be parsed or serialized.
    #[error("Invalid JSON in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `project.json` parsed, but is not a JSON object.
    #[error("Expected a JSON object in '{}'", .path.display())]
    NotAnObject { path: PathBuf },

    /// The directory walk failed.
    #[error("Failed to traverse '{}': {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A temporary file could not be moved over its target.
    #[error("Failed to replace '{}': {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
