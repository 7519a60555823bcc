/// dirlist CLI: argument parsing and the run loop behind the `dirlist` binary.
///
/// This crate contains no traversal logic. That lives in `dirlist-core`.
pub mod app;
pub mod args;

pub use app::{exit_status, run, Outcome, RunSummary};
pub use args::CliArgs;
