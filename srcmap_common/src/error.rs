//! Error types shared by every pipeline stage.
//!
//! Cross-reference mismatches and missed validation thresholds are not errors;
//! both are reported through return values.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The artifact a build-tree search was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Synthesis JSON netlist carrying `src` attributes.
    StructuredNetlist,
    /// Latest-stage textual netlist emitted by physical design.
    FinalNetlist,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::StructuredNetlist => write!(f, "structured synthesis netlist"),
            ArtifactKind::FinalNetlist => write!(f, "final textual netlist"),
        }
    }
}

/// Every way a pipeline stage can fail.
#[derive(Error, Debug)]
pub enum SrcMapError {
    /// A build-tree search found no candidate artifact.
    #[error("No {kind} found under {root}")]
    ArtifactNotFound {
        /// What was searched for.
        kind: ArtifactKind,
        /// Root of the search.
        root: PathBuf,
    },

    /// An explicitly requested sibling netlist does not exist.
    #[error("Textual sibling netlist not found: {path}")]
    SiblingNotFound {
        /// The requested path.
        path: PathBuf,
    },

    /// The validator's build-output root is not a directory.
    #[error("Build output directory does not exist: {path}")]
    NotADirectory {
        /// The requested root.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A structured netlist, sideband or report is not valid JSON.
    #[error("Malformed JSON in '{path}': {source}")]
    Json {
        /// File being decoded.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// One module names two cells identically.
    #[error("Cell '{cell}' appears more than once in module '{module}'")]
    DuplicateCell {
        /// Module containing the repeated name.
        module: String,
        /// The repeated cell name.
        cell: String,
    },

    /// TSV/CSV encoding failed.
    #[error("Failed to encode table: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed.
    #[error("Failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// The build tree could not be traversed.
    #[error("Failed to walk build tree: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SrcMapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SrcMapError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        SrcMapError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SrcMapError>;

/// Reads a whole file, attaching the path to any failure.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| SrcMapError::io(path, e))
}

/// Writes a fully rendered artifact in one call.
pub(crate) fn write_all(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| SrcMapError::io(path, e))
}
