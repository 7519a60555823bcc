/// Directory expander: the worker that turns one directory into work and results.
///
/// Loop:
/// 1. Take the next task from the work queue (blocking).
/// 2. `Shutdown` → stop.
/// 3. `Expand` → list the directory; subdirectories go back onto the work
///    queue, everything else goes to the results queue as a base name.
///
/// Unreadable directories follow the configured [`ErrorPolicy`]. Under
/// `FailFast` the first failure raises a shared abort flag. The sink raises
/// the same flag when its output breaks. From then on every expander still
/// drains its tasks (so the pending count reaches zero and the shutdown
/// broadcast happens) but no longer lists anything.
use crate::config::ErrorPolicy;
use crate::error::AccessError;
use crate::model::{DirTask, SinkItem};
use crate::platform::FileSystem;
use crate::queue::MsgQueue;
use crate::scanner::work::WorkQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// Per-expander counters, returned when the worker is joined.
#[derive(Debug, Default)]
pub struct ExpanderStats {
    /// Directories listed without a directory-level error.
    pub dirs_expanded: u64,
    /// File names pushed to the results queue.
    pub files_found: u64,
    /// Subdirectories pushed back onto the work queue.
    pub subdirs_queued: u64,
    /// Directories skipped under drain-after-abort.
    pub dirs_drained: u64,
    /// Recoverable errors (anything but the root listing failure).
    pub errors: Vec<AccessError>,
    /// The traversal root could not be listed at all.
    pub root_error: Option<AccessError>,
    /// The error that tripped fail-fast, if this worker tripped it.
    pub abort_cause: Option<AccessError>,
}

/// Everything an expander borrows from the coordinator.
pub struct ExpanderContext<'a, F> {
    pub fs: &'a F,
    pub work: &'a WorkQueue,
    pub results: &'a MsgQueue<SinkItem>,
    pub policy: ErrorPolicy,
    pub abort: &'a AtomicBool,
}

/// Run one expander until it receives a shutdown task.
pub fn run<F: FileSystem>(id: usize, ctx: &ExpanderContext<'_, F>) -> ExpanderStats {
    debug!(worker = id, "Expander starting");
    let mut stats = ExpanderStats::default();

    loop {
        let (path, depth) = match ctx.work.next() {
            DirTask::Shutdown => break,
            DirTask::Expand { path, depth } => (path, depth),
        };
        let _guard = ctx.work.begin();

        if ctx.abort.load(Ordering::Acquire) {
            stats.dirs_drained += 1;
            continue;
        }

        trace!(path = %path.display(), depth, "Expanding directory");
        let entries = match ctx.fs.list_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                record_failure(id, ctx, err, depth == 0, &mut stats);
                continue;
            }
        };
        match route_entries(ctx, entries, depth, &mut stats) {
            Ok(()) => stats.dirs_expanded += 1,
            Err(err) => record_failure(id, ctx, err, false, &mut stats),
        }
    }

    debug!(
        worker = id,
        dirs = stats.dirs_expanded,
        files = stats.files_found,
        errors = stats.errors.len(),
        "Expander stopped"
    );
    stats
}

/// Send subdirectories to the work queue and files to the results queue.
/// Entry failures are skipped or returned depending on the policy.
fn route_entries<F: FileSystem>(
    ctx: &ExpanderContext<'_, F>,
    entries: F::Entries,
    depth: u32,
    stats: &mut ExpanderStats,
) -> Result<(), AccessError> {
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if ctx.policy == ErrorPolicy::Skip => {
                warn!(path = %err.path.display(), kind = %err.kind, "Skipping unreadable entry");
                stats.errors.push(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        if entry.is_dir() {
            ctx.work.push_dir(entry.into_path(), depth + 1);
            stats.subdirs_queued += 1;
        } else {
            ctx.results.send(SinkItem::File(entry.name().clone()));
            stats.files_found += 1;
        }
    }
    Ok(())
}

fn record_failure<F>(
    id: usize,
    ctx: &ExpanderContext<'_, F>,
    err: AccessError,
    is_root: bool,
    stats: &mut ExpanderStats,
) {
    let tripped = ctx.policy == ErrorPolicy::FailFast
        && ctx
            .abort
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

    if is_root {
        warn!(worker = id, path = %err.path.display(), kind = %err.kind, "Cannot list start directory");
        stats.root_error = Some(err);
    } else if tripped {
        warn!(worker = id, path = %err.path.display(), kind = %err.kind, "Aborting traversal");
        stats.abort_cause = Some(err);
    } else {
        warn!(worker = id, path = %err.path.display(), kind = %err.kind, "Skipping unreadable directory");
        stats.errors.push(err);
    }
}
