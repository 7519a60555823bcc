/// Runtime configuration for a traversal.
///
/// Built by the front end (or by hand for library use) and validated once in
/// `traverse` before any worker starts.
use crate::error::ConfigError;

/// Number of directory expanders when nothing else is requested.
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound on directory expanders. Each one is an OS thread.
pub const MAX_WORKERS: usize = 256;

/// What an expander does when a directory cannot be listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log a warning, record the error, keep walking.
    #[default]
    Skip,
    /// Stop expanding at the first error and fail the traversal.
    FailFast,
}

/// Validated traversal settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Number of directory-expander threads.
    pub worker_count: usize,
    /// Treat symlinks to directories as directories (local filesystem only).
    pub follow_links: bool,
    pub error_policy: ErrorPolicy,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            follow_links: false,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl TraversalConfig {
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Reject settings the pool cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }
        Ok(())
    }
}
