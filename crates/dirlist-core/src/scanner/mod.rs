/// Scanner module: the worker pool and its coordinator.
///
/// Layout of one traversal:
///
/// ```text
///              seed(root)
///                  │
///                  ▼
///        ┌───────────────────┐   subdirectories
///        │    WorkQueue      │◄───────────────────┐
///        │ (MsgQueue+pending)│                    │
///        └─────────┬─────────┘                    │
///                  │ DirTask                      │
///     ┌────────────┼────────────┐                 │
///     ▼            ▼            ▼                 │
/// expander-0   expander-1 … expander-N ───────────┘
///     │            │            │
///     └────────────┼────────────┘ file names
///                  ▼
///        ┌───────────────────┐
///        │  MsgQueue<Sink>   │
///        └─────────┬─────────┘
///                  ▼
///                sink ──► output (one name per line)
/// ```
///
/// All threads are scoped to [`traverse`], so every worker is joined before
/// the queues are dropped, including when the wait phase unwinds.
pub mod expander;
pub mod report;
pub mod sink;
pub mod work;

pub use report::TraversalReport;
pub use work::WorkQueue;

use crate::config::TraversalConfig;
use crate::error::{Result, TraversalError, WorkerFailure};
use crate::model::SinkItem;
use crate::platform::{FileSystem, LocalFs};
use crate::queue::MsgQueue;
use expander::ExpanderContext;
use report::PoolTotals;
use sink::SinkOutcome;
use std::any::Any;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Instant;
use tracing::{error, info};

/// Walk the tree under `start` on the local disk, writing file names to `output`.
pub fn traverse_local<W>(
    start: impl AsRef<Path>,
    config: &TraversalConfig,
    output: W,
) -> Result<TraversalReport<W>>
where
    W: Write + Send,
{
    let fs = LocalFs::new().follow_links(config.follow_links);
    traverse(&fs, start, config, output)
}

/// Walk the tree under `start`, writing every non-directory base name to
/// `output`, one per line, in no particular order.
///
/// Blocks until the walk is complete and every worker has been joined.
pub fn traverse<F, W>(
    fs: &F,
    start: impl AsRef<Path>,
    config: &TraversalConfig,
    output: W,
) -> Result<TraversalReport<W>>
where
    F: FileSystem,
    W: Write + Send,
{
    config.validate()?;
    let start = start.as_ref();
    let started = Instant::now();

    info!(
        root = %start.display(),
        workers = config.worker_count,
        policy = ?config.error_policy,
        "Starting traversal"
    );

    let work = WorkQueue::new(config.worker_count);
    let results: MsgQueue<SinkItem> = MsgQueue::new();
    let abort = AtomicBool::new(false);
    let ctx = ExpanderContext {
        fs,
        work: &work,
        results: &results,
        policy: config.error_policy,
        abort: &abort,
    };

    work.seed(start);

    let (totals, sink_result, failures) = thread::scope(|scope| {
        let mut failures: Vec<WorkerFailure> = Vec::new();
        let mut expanders = Vec::with_capacity(config.worker_count);

        for id in 0..config.worker_count {
            let name = format!("dirlist-expander-{id}");
            let ctx = &ctx;
            match thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(scope, move || expander::run(id, ctx))
            {
                Ok(handle) => expanders.push((name, handle)),
                Err(source) => failures.push(WorkerFailure::Spawn {
                    worker: name,
                    source,
                }),
            }
        }

        let results = &results;
        let abort = &abort;
        let sink = thread::Builder::new()
            .name("dirlist-sink".into())
            .spawn_scoped(scope, move || sink::run(results, abort, output));

        let mut totals = PoolTotals::default();
        for (name, handle) in expanders {
            match handle.join() {
                Ok(stats) => totals.absorb(stats),
                Err(payload) => failures.push(panicked(name, payload)),
            }
        }

        results.send(SinkItem::Close);
        let sink_result = match sink {
            Ok(handle) => handle
                .join()
                .unwrap_or_else(|payload| Err(panicked("dirlist-sink".into(), payload))),
            Err(source) => Err(WorkerFailure::Spawn {
                worker: "dirlist-sink".into(),
                source,
            }),
        };

        (totals, sink_result, failures)
    });

    finish(start, config, started, totals, sink_result, failures)
}

/// Turn the joined pool state into the single traversal outcome.
fn finish<W>(
    start: &Path,
    config: &TraversalConfig,
    started: Instant,
    totals: PoolTotals,
    sink_result: std::result::Result<SinkOutcome<W>, WorkerFailure>,
    mut failures: Vec<WorkerFailure>,
) -> Result<TraversalReport<W>> {
    let SinkOutcome { output, emitted } = match sink_result {
        Ok(outcome) if failures.is_empty() => outcome,
        Ok(_) => return Err(worker_failures(start, failures)),
        Err(failure) => {
            failures.push(failure);
            return Err(worker_failures(start, failures));
        }
    };
    if let Some(err) = totals.root_error {
        return Err(TraversalError::Root(err));
    }
    if let Some(err) = totals.abort_cause {
        return Err(TraversalError::Aborted(err));
    }
    debug_assert_eq!(emitted, totals.files_found, "sink lost file names");

    let elapsed = started.elapsed();
    info!(
        root = %start.display(),
        files = emitted,
        dirs = totals.dirs_expanded,
        skipped = totals.skipped.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Traversal complete"
    );

    Ok(TraversalReport {
        output,
        files_emitted: emitted,
        dirs_expanded: totals.dirs_expanded,
        skipped: totals.skipped,
        workers: config.worker_count,
        elapsed,
    })
}

fn worker_failures(start: &Path, failures: Vec<WorkerFailure>) -> TraversalError {
    for failure in &failures {
        error!(root = %start.display(), %failure, "Worker failed");
    }
    TraversalError::Workers(failures)
}

fn panicked(worker: String, payload: Box<dyn Any + Send>) -> WorkerFailure {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    WorkerFailure::Panicked { worker, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPolicy;
    use crate::error::{AccessError, AccessErrorKind};
    use crate::platform::{DirEntry, MemoryFs};
    use std::collections::BTreeSet;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn lines(report: &TraversalReport<Vec<u8>>) -> BTreeSet<String> {
        String::from_utf8(report.output.clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_memory_tree_is_listed_completely() {
        let fs = MemoryFs::new()
            .with_file("/r/one")
            .with_file("/r/two")
            .with_file("/r/three")
            .with_file("/r/sub/four")
            .with_file("/r/sub/five");
        let report = traverse(&fs, "/r", &TraversalConfig::default(), Vec::new()).unwrap();

        assert_eq!(report.files_emitted, 5);
        assert_eq!(report.dirs_expanded, 2);
        assert_eq!(
            lines(&report),
            ["five", "four", "one", "three", "two"]
                .into_iter()
                .map(String::from)
                .collect()
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_every_worker_count_terminates() {
        let mut fs = MemoryFs::new();
        for d in 0..20 {
            for f in 0..10 {
                fs = fs.with_file(format!("/r/d{d}/nested/f{f}"));
            }
        }
        for workers in [1, 2, 3, 8, 32] {
            let config = TraversalConfig::default().with_workers(workers);
            let report = traverse(&fs, "/r", &config, Vec::new()).unwrap();
            assert_eq!(report.files_emitted, 200, "workers = {workers}");
            assert_eq!(report.dirs_expanded, 41, "workers = {workers}");
            assert_eq!(report.workers, workers);
        }
    }

    #[test]
    fn test_invalid_config_starts_nothing() {
        let fs = MemoryFs::new().with_dir("/r");
        let err = traverse(&fs, "/r", &TraversalConfig::default().with_workers(0), Vec::new())
            .unwrap_err();
        assert!(matches!(err, TraversalError::Config(_)));
    }

    #[test]
    fn test_missing_root_is_reported() {
        let fs = MemoryFs::new();
        let err = traverse(&fs, "/gone", &TraversalConfig::default(), Vec::new()).unwrap_err();
        match err {
            TraversalError::Root(e) => assert_eq!(e.kind, AccessErrorKind::NotFound),
            other => panic!("expected root error, got {other}"),
        }
    }

    #[test]
    fn test_fail_fast_aborts() {
        let fs = MemoryFs::new()
            .with_file("/r/a.txt")
            .deny("/r/locked");
        let config = TraversalConfig::default().with_error_policy(ErrorPolicy::FailFast);
        let err = traverse(&fs, "/r", &config, Vec::new()).unwrap_err();
        match err {
            TraversalError::Aborted(e) => {
                assert_eq!(e.kind, AccessErrorKind::PermissionDenied);
                assert!(e.is_for(Path::new("/r/locked")));
            }
            other => panic!("expected abort, got {other}"),
        }
    }

    /// Filesystem whose listing of one directory panics.
    struct PanickingFs {
        inner: MemoryFs,
        trap: &'static str,
    }

    impl FileSystem for PanickingFs {
        type Entries = std::vec::IntoIter<std::result::Result<DirEntry, AccessError>>;

        fn list_entries(
            &self,
            dir: &Path,
        ) -> std::result::Result<Self::Entries, AccessError> {
            if dir == Path::new(self.trap) {
                panic!("listing {} exploded", dir.display());
            }
            self.inner.list_entries(dir)
        }
    }

    #[test]
    fn test_panicking_worker_is_reported_and_pool_still_stops() {
        let fs = PanickingFs {
            inner: MemoryFs::new()
                .with_file("/r/ok.txt")
                .with_file("/r/boom/x.txt"),
            trap: "/r/boom",
        };
        let err = traverse(&fs, "/r", &TraversalConfig::default(), Vec::new()).unwrap_err();
        match err {
            TraversalError::Workers(failures) => {
                assert_eq!(failures.len(), 1);
                match &failures[0] {
                    WorkerFailure::Panicked { worker, message } => {
                        assert!(worker.starts_with("dirlist-expander-"));
                        assert!(message.contains("exploded"));
                    }
                    other => panic!("expected panic failure, got {other}"),
                }
            }
            other => panic!("expected worker failure, got {other}"),
        }
    }

    /// Filesystem that counts listings. Subdirectories are only listed once
    /// the output has failed, and slowly, so any listing done after that
    /// point shows up in the count.
    struct CountingFs<'a> {
        inner: MemoryFs,
        calls: AtomicUsize,
        output_failed: &'a AtomicBool,
    }

    impl FileSystem for CountingFs<'_> {
        type Entries = std::vec::IntoIter<std::result::Result<DirEntry, AccessError>>;

        fn list_entries(
            &self,
            dir: &Path,
        ) -> std::result::Result<Self::Entries, AccessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if dir != Path::new("/r") {
                let deadline = Instant::now() + Duration::from_secs(10);
                while !self.output_failed.load(Ordering::SeqCst) {
                    assert!(Instant::now() < deadline, "output never failed");
                    thread::sleep(Duration::from_millis(1));
                }
                thread::sleep(Duration::from_millis(5));
            }
            self.inner.list_entries(dir)
        }
    }

    /// Writer whose reader has gone away.
    #[derive(Debug)]
    struct ClosedOutput<'a> {
        failed: &'a AtomicBool,
    }

    impl Write for ClosedOutput<'_> {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.failed.store(true, Ordering::SeqCst);
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_output_stops_listing() {
        let mut inner = MemoryFs::new().with_file("/r/a.txt");
        for d in 0..2000 {
            inner = inner.with_file(format!("/r/d{d:04}/f.txt"));
        }
        let output_failed = AtomicBool::new(false);
        let fs = CountingFs {
            inner,
            calls: AtomicUsize::new(0),
            output_failed: &output_failed,
        };
        let config = TraversalConfig::default();

        let err = traverse(
            &fs,
            "/r",
            &config,
            ClosedOutput {
                failed: &output_failed,
            },
        )
        .unwrap_err();

        match err {
            TraversalError::Workers(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(
                    &failures[0],
                    WorkerFailure::Output { source } if source.kind() == io::ErrorKind::BrokenPipe
                ));
            }
            other => panic!("expected output failure, got {other}"),
        }
        // The root plus at most a couple of listings per expander in flight.
        let calls = fs.calls.load(Ordering::SeqCst);
        assert!(
            calls <= 1 + 2 * config.worker_count,
            "listed {calls} directories after the output closed"
        );
    }
}
