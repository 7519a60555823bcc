/// In-memory filesystem tree.
///
/// Built once with the `with_*` methods and then shared read-only between
/// workers. Parent directories are created implicitly. `deny` marks a
/// directory as unreadable so permission failures can be reproduced without
/// touching real file modes.
use super::{DirEntry, FileSystem};
use crate::error::{AccessError, AccessErrorKind};
use compact_str::CompactString;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum MemNode {
    Dir {
        children: BTreeSet<PathBuf>,
        readable: bool,
    },
    File,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    nodes: BTreeMap<PathBuf, MemNode>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an (empty) directory and any missing ancestors.
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.ensure_dir(path.as_ref());
        self
    }

    /// Add a file and any missing ancestor directories.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Some(parent) = parent_of(path) {
            self.ensure_dir(parent);
            self.link(parent, path);
        }
        self.nodes.insert(path.to_path_buf(), MemNode::File);
        self
    }

    /// Make listing `path` fail with `PermissionDenied`.
    pub fn deny(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.ensure_dir(path);
        if let Some(MemNode::Dir { readable, .. }) = self.nodes.get_mut(path) {
            *readable = false;
        }
        self
    }

    fn ensure_dir(&mut self, path: &Path) {
        if self.nodes.contains_key(path) {
            return;
        }
        self.nodes.insert(
            path.to_path_buf(),
            MemNode::Dir {
                children: BTreeSet::new(),
                readable: true,
            },
        );
        if let Some(parent) = parent_of(path) {
            self.ensure_dir(parent);
            self.link(parent, path);
        }
    }

    fn link(&mut self, parent: &Path, child: &Path) {
        if let Some(MemNode::Dir { children, .. }) = self.nodes.get_mut(parent) {
            children.insert(child.to_path_buf());
        }
    }

    fn entry_for(&self, path: &Path) -> DirEntry {
        let name = path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_default();
        let is_dir = matches!(self.nodes.get(path), Some(MemNode::Dir { .. }));
        DirEntry::new(name, path, is_dir)
    }
}

/// Parent that is itself a tree node (`"a"` has no parent, `"/a"` has `"/"`).
fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

impl FileSystem for MemoryFs {
    type Entries = std::vec::IntoIter<Result<DirEntry, AccessError>>;

    fn list_entries(&self, dir: &Path) -> Result<Self::Entries, AccessError> {
        match self.nodes.get(dir) {
            None => Err(AccessError::new(dir, AccessErrorKind::NotFound)),
            Some(MemNode::File) => Err(AccessError::new(dir, AccessErrorKind::NotADirectory)),
            Some(MemNode::Dir {
                readable: false, ..
            }) => Err(AccessError::new(dir, AccessErrorKind::PermissionDenied)),
            Some(MemNode::Dir { children, .. }) => Ok(children
                .iter()
                .map(|child| Ok(self.entry_for(child)))
                .collect::<Vec<_>>()
                .into_iter()),
        }
    }
}
