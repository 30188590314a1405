//! Sink implementations
//!
//! Contains MemorySink, LogSink, StdoutSink, FileSink, and NetworkSink.

mod file;
mod log;
mod memory;
mod network;
mod stdout;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::memory::MemorySink;
pub use self::network::{NetworkProtocol, NetworkSink, NetworkSinkConfig};
pub use self::stdout::StdoutSink;
