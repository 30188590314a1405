//! MemorySink - accumulates writes in an in-memory buffer

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use contracts::{ByteSink, ContractError, TextSink};
use tokio::sync::Mutex;

/// Sink that appends every write to a growable buffer
pub struct MemorySink {
    name: String,
    buffer: Mutex<Vec<u8>>,
    write_count: AtomicU64,
    text_write_count: AtomicU64,
}

impl MemorySink {
    /// Create a new, empty MemorySink
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: Mutex::new(Vec::new()),
            write_count: AtomicU64::new(0),
            text_write_count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of everything written so far
    pub async fn contents(&self) -> Vec<u8> {
        self.buffer.lock().await.clone()
    }

    /// Buffer contents decoded as UTF-8 (lossy)
    pub async fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().await).into_owned()
    }

    pub async fn len(&self) -> usize {
        self.buffer.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buffer.lock().await.is_empty()
    }

    /// Number of byte writes received
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Number of native text writes received
    pub fn text_write_count(&self) -> u64 {
        self.text_write_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ByteSink for MemorySink {
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        self.buffer.lock().await.extend_from_slice(buf);
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(buf.len())
    }

    fn as_text_sink(&self) -> Option<&dyn TextSink> {
        Some(self)
    }
}

#[async_trait]
impl TextSink for MemorySink {
    async fn write_str(&self, text: &str) -> Result<usize, ContractError> {
        self.buffer.lock().await.extend_from_slice(text.as_bytes());
        self.text_write_count.fetch_add(1, Ordering::Relaxed);
        Ok(text.len())
    }
}
