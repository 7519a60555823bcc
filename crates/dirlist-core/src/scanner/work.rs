/// Self-feeding directory queue with in-flight accounting.
///
/// Expanders are both the consumers and the producers of this queue, so an
/// empty queue does not mean the walk is done: another expander may be about
/// to push more directories. Completion is tracked with a pending count:
///
/// - incremented *before* every directory is queued,
/// - decremented only *after* that directory has been fully expanded
///   (including queueing all of its subdirectories).
///
/// Children are counted before their parent is released, so the count can
/// only reach zero once no directory is queued or being expanded. Whichever
/// expander drops it to zero broadcasts one [`DirTask::Shutdown`] per worker,
/// so every expander stops without any thread polling.
use crate::model::DirTask;
use crate::queue::MsgQueue;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

pub struct WorkQueue {
    tasks: MsgQueue<DirTask>,
    pending: AtomicUsize,
    workers: usize,
}

impl WorkQueue {
    /// Queue shared by `workers` expanders.
    pub fn new(workers: usize) -> Self {
        Self {
            tasks: MsgQueue::new(),
            pending: AtomicUsize::new(0),
            workers,
        }
    }

    /// Queue the traversal root.
    pub fn seed(&self, root: impl Into<PathBuf>) {
        self.push(DirTask::root(root));
    }

    /// Queue a discovered subdirectory.
    pub fn push_dir(&self, path: PathBuf, depth: u32) {
        self.push(DirTask::Expand { path, depth });
    }

    fn push(&self, task: DirTask) {
        debug_assert!(!task.is_shutdown(), "sentinels bypass pending accounting");
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tasks.send(task);
    }

    /// Block until the next task is available.
    pub fn next(&self) -> DirTask {
        self.tasks.receive()
    }

    /// Mark a received directory as in progress. Dropping the guard
    /// completes it.
    pub fn begin(&self) -> WorkGuard<'_> {
        WorkGuard { queue: self }
    }

    fn complete_one(&self) {
        let before = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(before > 0, "pending count underflow");
        if before == 1 {
            self.broadcast_shutdown();
        }
    }

    /// Retire a single expander, outside pending accounting.
    pub fn stop_one(&self) {
        self.tasks.send(DirTask::Shutdown);
    }

    /// Send one poison pill per expander.
    pub fn broadcast_shutdown(&self) {
        debug!(workers = self.workers, "No directories outstanding, stopping expanders");
        self.tasks
            .send_many(std::iter::repeat(DirTask::Shutdown).take(self.workers));
    }

    /// Directories queued or being expanded right now.
    pub fn outstanding(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// `true` once every queued directory has been expanded.
    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// RAII marker for a directory being expanded.
///
/// Releasing on drop keeps the pending count honest even when an expander
/// unwinds from a panic.
pub struct WorkGuard<'a> {
    queue: &'a WorkQueue,
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        self.queue.complete_one();
    }
}
