//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `backend/` - Execution backends (Local, Remote over ssh/scp)
//! - `toolchain/` - Compiler, archive packer, datastore reset, log viewer
//! - `events/` - Event sinks (console, NDJSON)
//! - `logging` - tracing subscriber setup

pub mod backend;
pub mod events;
pub mod logging;
pub mod toolchain;

// Re-export for convenience
pub use backend::{backend_for, LocalBackend, RemoteBackend, RemoteSettings};
pub use events::{ConsoleEventSink, JsonEventSink};
pub use logging::{init_logging, LogLevel};
pub use toolchain::{CargoCompiler, CommandDatastoreReset, CommandPacker, ProgramLogViewer};
