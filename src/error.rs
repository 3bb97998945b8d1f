//! Task-level build errors.

use crate::manifest::ManifestError;
use crate::transforms::TransformError;
use std::io;
use std::path::PathBuf;

/// Coarse classification of a build failure, reported per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required source file or the manifest is missing
    NotFound,
    /// An opaque stage rejected its input
    TransformFailure,
    /// An output or the manifest could not be written
    PersistenceFailure,
    /// Anything else (unreadable file, bad pattern, scheduling)
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::TransformFailure => write!(f, "transform failure"),
            ErrorKind::PersistenceFailure => write!(f, "persistence failure"),
            ErrorKind::Other => write!(f, "error"),
        }
    }
}

/// Error raised by a task action.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A required source file does not exist
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A stage rejected the content of `path`
    #[error("Failed to transform {}: {source}", path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    /// An output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest load or save failed
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A source file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configured glob is malformed
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// No task is registered under this name
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// A task with this name is already registered
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    /// The task is already running
    #[error("Task '{0}' is already running")]
    Busy(String),
}

impl BuildError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::NotFound(_) => ErrorKind::NotFound,
            BuildError::Transform { .. } => ErrorKind::TransformFailure,
            BuildError::Persistence { .. } => ErrorKind::PersistenceFailure,
            BuildError::Manifest(ManifestError::NotFound(_)) => ErrorKind::NotFound,
            BuildError::Manifest(ManifestError::Persistence { .. }) => {
                ErrorKind::PersistenceFailure
            }
            BuildError::Manifest(_)
            | BuildError::Read { .. }
            | BuildError::Pattern { .. }
            | BuildError::UnknownTask(_)
            | BuildError::DuplicateTask(_)
            | BuildError::Busy(_) => ErrorKind::Other,
        }
    }
}

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
