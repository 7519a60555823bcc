/// Result sink: the single consumer of discovered file names.
///
/// Writes one name per line to its output until it receives
/// [`SinkItem::Close`]. The coordinator only sends `Close` after every
/// expander has been joined, so FIFO order guarantees that every name
/// produced during the walk is written before the sink stops.
///
/// If the output breaks, the sink raises the shared abort flag before it
/// stops, so expanders drain the remaining directories without listing them.
use crate::error::WorkerFailure;
use crate::model::SinkItem;
use crate::queue::MsgQueue;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// What the sink hands back when it stops cleanly.
#[derive(Debug)]
pub struct SinkOutcome<W> {
    /// The output writer, flushed.
    pub output: W,
    /// Number of names written.
    pub emitted: u64,
}

/// Drain `results` into `output` until `Close` arrives.
pub fn run<W: Write>(
    results: &MsgQueue<SinkItem>,
    abort: &AtomicBool,
    mut output: W,
) -> Result<SinkOutcome<W>, WorkerFailure> {
    debug!("Sink starting");
    let mut emitted: u64 = 0;

    loop {
        match results.receive() {
            SinkItem::File(name) => {
                if let Err(source) = writeln!(output, "{name}") {
                    abort.store(true, Ordering::Release);
                    error!(emitted, error = %source, "Sink output failed, stopping expanders");
                    return Err(WorkerFailure::Output { source });
                }
                emitted += 1;
            }
            SinkItem::Close => break,
        }
    }

    output.flush().map_err(|source| {
        abort.store(true, Ordering::Release);
        WorkerFailure::Output { source }
    })?;
    debug!(emitted, "Sink stopped");
    Ok(SinkOutcome { output, emitted })
}
