/// Command-line arguments.
///
/// Parsing failures (missing directory, extra arguments, bad worker count)
/// are reported by clap as usage errors before any thread starts.
use clap::{ArgAction, Parser};
use dirlist_core::config::DEFAULT_WORKERS;
use dirlist_core::{ErrorPolicy, TraversalConfig};
use std::path::PathBuf;
use tracing::Level;

/// List every file under a directory, one name per line.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dirlist",
    version,
    about = "List every file under a directory, one name per line",
    long_about = "Walks DIRECTORY recursively with a pool of worker threads and prints the \
                  base name of every non-directory entry to stdout, one per line, in no \
                  particular order.\n\n\
                  Unreadable subdirectories are reported on stderr and skipped unless \
                  --fail-fast is given.",
    after_help = "EXAMPLES:\n    \
        dirlist /var/log\n    \
        dirlist -w 16 ~/src | sort\n    \
        dirlist --fail-fast --follow-links /mnt/share"
)]
pub struct CliArgs {
    /// Directory to list
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Number of directory worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = DEFAULT_WORKERS,
        value_name = "NUM",
        value_parser = parse_workers
    )]
    pub workers: usize,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_links: bool,

    /// Stop at the first unreadable directory instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Increase log detail on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Traversal settings requested on the command line.
    pub fn to_config(&self) -> TraversalConfig {
        let policy = if self.fail_fast {
            ErrorPolicy::FailFast
        } else {
            ErrorPolicy::Skip
        };
        TraversalConfig::default()
            .with_workers(self.workers)
            .with_follow_links(self.follow_links)
            .with_error_policy(policy)
    }

    /// Maximum level for the stderr log subscriber.
    ///
    /// Warnings are on by default so skipped directories are visible.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn parse_workers(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a whole number"))?;
    TraversalConfig::default()
        .with_workers(count)
        .validate()
        .map_err(|e| e.to_string())?;
    Ok(count)
}
