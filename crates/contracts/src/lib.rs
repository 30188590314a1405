//! # Contracts
//!
//! Interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Sink model
//! - A sink accepts bytes and reports how many it accepted
//! - A sink may additionally accept text natively (`TextSink`)
//! - Sinks are shared as `Arc<dyn ByteSink>` handles; their lifecycle stays with the caller

mod blueprint;
mod error;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use sink::*;
