/// Runs one traversal for the command line and maps its outcome to an exit
/// status.
///
/// Names go to the caller's writer (stdout in the binary). Everything else,
/// skipped directories included, is reported through `tracing` on stderr.
use crate::args::CliArgs;
use anyhow::{Context, Result};
use dirlist_core::{traverse_local, TraversalError, WorkerFailure};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{info, warn};

/// Exit status for a completed run, including runs with skipped directories.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status when the traversal itself failed.
pub const EXIT_FAILURE: u8 = 1;

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every reachable file name was written.
    Complete(RunSummary),
    /// The reader of our output went away (e.g. `dirlist dir | head`).
    OutputClosed,
}

/// Counters from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files: u64,
    pub dirs: u64,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Walk `args.directory` and write every file name to `out`.
pub fn run<W>(args: &CliArgs, out: W) -> Result<Outcome>
where
    W: Write + Send,
{
    let config = args.to_config();
    let report = match traverse_local(&args.directory, &config, out) {
        Ok(report) => report,
        Err(err) if is_broken_pipe(&err) => {
            info!("Output closed by reader, stopping");
            return Ok(Outcome::OutputClosed);
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to list '{}'", args.directory.display())
            })
        }
    };

    // Each skip was already logged with its path by the expander that hit it.
    if !report.is_clean() {
        warn!(
            skipped = report.skipped.len(),
            root = %args.directory.display(),
            "Listing incomplete, some directories could not be read"
        );
    }

    Ok(Outcome::Complete(RunSummary {
        files: report.files_emitted,
        dirs: report.dirs_expanded,
        skipped: report.skipped.len(),
        elapsed: report.elapsed,
    }))
}

/// Process exit status for the result of [`run`].
pub fn exit_status(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}

/// `true` when the only failure was the output pipe closing.
fn is_broken_pipe(err: &TraversalError) -> bool {
    match err {
        TraversalError::Workers(failures) => {
            !failures.is_empty()
                && failures.iter().all(|f| {
                    matches!(f, WorkerFailure::Output { source }
                        if source.kind() == io::ErrorKind::BrokenPipe)
                })
        }
        _ => false,
    }
}
