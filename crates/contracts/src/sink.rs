//! Sink traits - fan-out input/output interface
//!
//! Defines the byte-accepting sink capability and the optional
//! text-accepting capability layered on top of it.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ContractError;

/// Shared handle to a sink
///
/// The holder may invoke writes; opening, flushing and closing stay with
/// whoever constructed the sink.
pub type SharedSink = Arc<dyn ByteSink>;

/// Concrete-type access for trait objects
///
/// Blanket-implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Byte output trait
///
/// All sink implementations must implement this trait.
#[async_trait]
pub trait ByteSink: AsAny + Send + Sync {
    /// Write a byte sequence
    ///
    /// Returns the number of bytes accepted, at most `buf.len()`.
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError>;

    /// Native text capability, if this sink has one
    fn as_text_sink(&self) -> Option<&dyn TextSink> {
        None
    }
}

/// Text output trait
///
/// Implemented by sinks that accept a string directly without the caller
/// first turning it into bytes. The returned count is in UTF-8 bytes.
#[async_trait]
pub trait TextSink: ByteSink {
    async fn write_str(&self, text: &str) -> Result<usize, ContractError>;
}

/// Downcast a sink handle to its concrete type
pub fn downcast_sink<T: Any>(sink: &SharedSink) -> Option<&T> {
    <dyn ByteSink as AsAny>::as_any(sink.as_ref()).downcast_ref::<T>()
}
