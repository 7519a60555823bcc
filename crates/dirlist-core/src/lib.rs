/// dirlist core: concurrent directory traversal engine.
///
/// This crate contains all traversal logic with no terminal or argument
/// parsing dependencies. Front ends (the CLI, tests, embedders) call
/// [`scanner::traverse`] with a [`platform::FileSystem`] and a writer.
///
/// # Modules
///
/// - [`queue`]: Blocking, unbounded FIFO shared between worker threads.
/// - [`model`]: Work items, sink items, and the file-name type.
/// - [`platform`]: Filesystem access: real disk and in-memory trees.
/// - [`scanner`]: Directory expanders, result sink, and the pool coordinator.
/// - [`config`]: Traversal settings and validation.
/// - [`error`]: Typed failures for access, workers, and configuration.
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod queue;
pub mod scanner;

pub use config::{ErrorPolicy, TraversalConfig};
pub use error::{AccessError, AccessErrorKind, TraversalError, WorkerFailure};
pub use scanner::{traverse, traverse_local, TraversalReport};
