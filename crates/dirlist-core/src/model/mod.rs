/// Data model shared by the workers.
///
/// Re-exports the queue item types and the file-name alias.
pub mod task;

pub use task::{DirTask, FileName, SinkItem};
