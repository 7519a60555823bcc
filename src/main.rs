//! dirlist: parallel recursive directory lister.
//!
//! Thin binary entry point. All logic lives in the `dirlist-core`
//! and `dirlist-cli` crates.

use clap::Parser;
use dirlist_cli::{exit_status, run, CliArgs};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // Usage errors exit with status 2 here, before logging is set up.
    let args = CliArgs::parse();

    // Diagnostics go to stderr; stdout carries only file names.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(args.log_level())
        .with_target(false)
        .init();

    // The traversal logs its own completion.
    let result = run(&args, BufWriter::new(io::stdout()));
    if let Err(e) = &result {
        error!("{e:#}");
    }
    ExitCode::from(exit_status(&result))
}
