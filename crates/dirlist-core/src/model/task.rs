/// Items that travel through the two worker queues.
///
/// Both queues carry an explicit stop variant instead of an in-band magic
/// value, so a real directory can never be mistaken for the sentinel.
use compact_str::CompactString;
use std::path::PathBuf;

/// Base name of a discovered non-directory entry (not its full path).
pub type FileName = CompactString;

/// A unit of work on the directory queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirTask {
    /// Expand this directory: list it, queue subdirectories, emit files.
    Expand {
        /// Directory to list.
        path: PathBuf,
        /// Distance from the traversal root (root = 0).
        depth: u32,
    },
    /// Poison pill: the receiving expander stops.
    Shutdown,
}

impl DirTask {
    /// Task for the traversal root.
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self::Expand {
            path: path.into(),
            depth: 0,
        }
    }

    /// `true` for the poison pill.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown)
    }
}

/// A unit of output on the results queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkItem {
    /// A discovered file name to emit.
    File(FileName),
    /// No more names will follow; the sink flushes and stops.
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_depth_zero() {
        match DirTask::root("/srv") {
            DirTask::Expand { path, depth } => {
                assert_eq!(path, PathBuf::from("/srv"));
                assert_eq!(depth, 0);
            }
            DirTask::Shutdown => panic!("root task must expand"),
        }
    }

    #[test]
    fn test_only_shutdown_is_sentinel() {
        assert!(DirTask::Shutdown.is_shutdown());
        assert!(!DirTask::root("/srv").is_shutdown());
    }
}
