//! # Fanout
//!
//! Concurrent fan-out writer.
//!
//! Responsibilities:
//! - Duplicate every write to a fixed, flat list of sinks
//! - Run the per-sink writes concurrently, one task per sink
//! - Report a single outcome: the full length, or the first failure
//!
//! Sinks are external collaborators; the writer only holds handles to them.
//! A few ready-made sinks live in [`sinks`].

pub mod builder;
pub mod error;
pub mod sinks;
pub mod writer;

pub use builder::{create_sink, create_writer, FanoutBuilder};
pub use contracts::{ByteSink, ContractError, SharedSink, SinkConfig, SinkType, TextSink};
pub use error::FanoutError;
pub use observability::WriteOutcome;
pub use sinks::{FileSink, LogSink, MemorySink, NetworkSink, StdoutSink};
pub use writer::{write_outcome, FanoutWriter};
