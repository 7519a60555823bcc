/// Filesystem access: the only way workers touch storage.
///
/// Workers are generic over [`FileSystem`], so the same expander loop runs
/// against the real disk ([`LocalFs`]) or an in-memory tree ([`MemoryFs`]).
/// Implementations must be callable from many threads at once without
/// external locking.
pub mod local;
pub mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use crate::error::AccessError;
use crate::model::FileName;
use std::path::{Path, PathBuf};

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: FileName,
    path: PathBuf,
    is_dir: bool,
}

impl DirEntry {
    pub fn new(name: impl Into<FileName>, path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir,
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> &FileName {
        &self.name
    }

    /// Full path, suitable for queueing when the entry is a directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Consume the entry, keeping only its path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Directory listing service used by the expander workers.
pub trait FileSystem: Sync {
    /// Lazy sequence of a directory's children. Individual entries may fail.
    type Entries: Iterator<Item = Result<DirEntry, AccessError>>;

    /// List the immediate children of `dir`.
    ///
    /// Fails with [`AccessError`] when `dir` is missing, unreadable, or not a
    /// directory.
    fn list_entries(&self, dir: &Path) -> Result<Self::Entries, AccessError>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    type Entries = F::Entries;

    fn list_entries(&self, dir: &Path) -> Result<Self::Entries, AccessError> {
        (**self).list_entries(dir)
    }
}
