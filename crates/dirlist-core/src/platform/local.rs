/// Real-disk filesystem backed by `std::fs::read_dir`.
///
/// Classification of entries:
/// - `follow_links = false`: the entry's own file type decides, so a symlink
///   to a directory is reported as a file and never expanded.
/// - `follow_links = true`: the link target decides. A dangling link is a
///   file. There is no cycle detection.
use super::{DirEntry, FileSystem};
use crate::error::{AccessError, AccessErrorKind};
use compact_str::CompactString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs {
    follow_links: bool,
}

impl LocalFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat symlinks to directories as directories.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

impl FileSystem for LocalFs {
    type Entries = LocalEntries;

    fn list_entries(&self, dir: &Path) -> Result<Self::Entries, AccessError> {
        match fs::read_dir(dir) {
            Ok(inner) => Ok(LocalEntries {
                inner,
                dir: dir.to_path_buf(),
                follow_links: self.follow_links,
            }),
            Err(err) => {
                // ENOTDIR is not mapped to its own io::ErrorKind everywhere; check directly.
                if fs::metadata(dir).is_ok_and(|meta| !meta.is_dir()) {
                    return Err(AccessError {
                        path: dir.to_path_buf(),
                        kind: AccessErrorKind::NotADirectory,
                        source: Some(err),
                    });
                }
                Err(AccessError::from_io(dir, err))
            }
        }
    }
}

/// Iterator over one directory's entries on disk.
pub struct LocalEntries {
    inner: fs::ReadDir,
    dir: PathBuf,
    follow_links: bool,
}

impl Iterator for LocalEntries {
    type Item = Result<DirEntry, AccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(e) => e,
            Err(err) => return Some(Err(AccessError::from_io(&self.dir, err))),
        };

        let path = entry.path();
        let is_dir = if self.follow_links {
            fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false)
        } else {
            match entry.file_type() {
                Ok(ft) => ft.is_dir(),
                Err(err) => return Some(Err(AccessError::from_io(path, err))),
            }
        };

        let name = CompactString::new(entry.file_name().to_string_lossy());
        Some(Ok(DirEntry::new(name, path, is_dir)))
    }
}
