/// Error types for the traversal engine.
///
/// Failures are split by who can act on them:
/// - [`AccessError`]: one directory could not be listed. Recoverable at the
///   worker level; carries the failing path and a coarse kind.
/// - [`WorkerFailure`]: a worker thread died or its output broke.
/// - [`ConfigError`]: rejected before any thread starts.
/// - [`TraversalError`]: the single aggregated outcome of `traverse`.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of why a directory could not be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessErrorKind {
    /// The path does not exist (or vanished mid-walk).
    NotFound,
    /// The process lacks permission to list the directory.
    PermissionDenied,
    /// The path exists but is not a directory.
    NotADirectory,
    /// Anything else the OS reported.
    Other,
}

impl AccessErrorKind {
    /// Map an `io::ErrorKind` onto the traversal's error kinds.
    pub fn from_io(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for AccessErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::NotADirectory => "not a directory",
            Self::Other => "unreadable",
        };
        f.write_str(label)
    }
}

/// A directory (or one of its entries) could not be listed or inspected.
#[derive(Error, Debug)]
#[error("cannot read '{}': {kind}", .path.display())]
pub struct AccessError {
    /// Path whose listing failed.
    pub path: PathBuf,
    /// Classified failure reason.
    pub kind: AccessErrorKind,
    /// Underlying OS error, when there is one.
    #[source]
    pub source: Option<io::Error>,
}

impl AccessError {
    /// Build an `AccessError` from an OS error for `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self {
            path: path.into(),
            kind: AccessErrorKind::from_io(err.kind()),
            source: Some(err),
        }
    }

    /// Build an `AccessError` without an underlying OS error.
    pub fn new(path: impl Into<PathBuf>, kind: AccessErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
            source: None,
        }
    }

    /// `true` when this error refers to `path`.
    pub fn is_for(&self, path: &Path) -> bool {
        self.path == path
    }
}

/// A worker thread that did not finish cleanly.
#[derive(Error, Debug)]
pub enum WorkerFailure {
    /// The worker panicked; the panic payload is rendered into `message`.
    #[error("worker '{worker}' panicked: {message}")]
    Panicked { worker: String, message: String },

    /// The OS refused to start the worker thread.
    #[error("failed to spawn worker '{worker}': {source}")]
    Spawn {
        worker: String,
        #[source]
        source: io::Error,
    },

    /// The sink could not write to its output.
    #[error("sink output failed: {source}")]
    Output {
        #[source]
        source: io::Error,
    },
}

/// Rejected traversal configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count outside `1..=max`.
    #[error("invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },
}

/// Aggregated outcome of a failed traversal.
#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// The starting directory itself could not be listed.
    #[error("start directory unreadable")]
    Root(#[source] AccessError),

    /// Fail-fast policy stopped the walk at the first unreadable directory.
    #[error("traversal aborted")]
    Aborted(#[source] AccessError),

    /// One or more workers failed. Every failure is kept with its worker.
    #[error("{} worker(s) failed: {}", .0.len(), join_failures(.0))]
    Workers(Vec<WorkerFailure>),
}

impl TraversalError {
    /// The access error behind this failure, if it was caused by one.
    pub fn access_error(&self) -> Option<&AccessError> {
        match self {
            Self::Root(e) | Self::Aborted(e) => Some(e),
            _ => None,
        }
    }
}

fn join_failures(failures: &[WorkerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for traversal operations.
pub type Result<T> = std::result::Result<T, TraversalError>;
