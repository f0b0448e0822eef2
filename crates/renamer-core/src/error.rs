//! Error types for plan loading and run configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or editing a rename plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Input folder could not be listed.
    #[error("Cannot read folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// An edit referenced an item that is not in the plan.
    #[error("No item at position {index} (plan has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The session is missing something it needs.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl PlanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Problems detected before a run starts. A run never begins when one of
/// these is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No input folder selected")]
    MissingInputDir,

    #[error("No output folder selected")]
    MissingOutputDir,

    #[error("There are no files to rename")]
    EmptyPlan,

    #[error("Input folder does not exist: {path}")]
    InputDirNotFound { path: PathBuf },

    #[error("Cannot use output folder {path}: {message}")]
    OutputUnavailable { path: PathBuf, message: String },
}
