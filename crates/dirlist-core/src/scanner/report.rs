/// Traversal summary: what a finished walk hands back to its caller.
///
/// Counters are aggregated from every expander after it has been joined, so
/// they are exact once `traverse` returns.
use crate::error::AccessError;
use crate::scanner::expander::ExpanderStats;
use std::time::Duration;

/// Successful traversal outcome.
#[derive(Debug)]
pub struct TraversalReport<W> {
    /// The output writer after the sink flushed it.
    pub output: W,
    /// Names written by the sink.
    pub files_emitted: u64,
    /// Directories listed, including the root.
    pub dirs_expanded: u64,
    /// Directories and entries that could not be read and were skipped.
    pub skipped: Vec<AccessError>,
    /// Number of expander threads used.
    pub workers: usize,
    /// Wall-clock time from seeding to the last join.
    pub elapsed: Duration,
}

impl<W> TraversalReport<W> {
    /// `true` if nothing had to be skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Sum of every expander's counters.
#[derive(Debug, Default)]
pub(crate) struct PoolTotals {
    pub dirs_expanded: u64,
    pub files_found: u64,
    pub skipped: Vec<AccessError>,
    pub root_error: Option<AccessError>,
    pub abort_cause: Option<AccessError>,
}

impl PoolTotals {
    pub fn absorb(&mut self, stats: ExpanderStats) {
        self.dirs_expanded += stats.dirs_expanded;
        self.files_found += stats.files_found;
        self.skipped.extend(stats.errors);
        if self.root_error.is_none() {
            self.root_error = stats.root_error;
        }
        if self.abort_cause.is_none() {
            self.abort_cause = stats.abort_cause;
        }
    }
}
