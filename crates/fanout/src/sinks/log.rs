//! LogSink - logs write summaries via tracing

use async_trait::async_trait;
use contracts::{ByteSink, ContractError, TextSink};
use tracing::{info, instrument};

/// Longest text fragment included in a log event
const PREVIEW_LEN: usize = 64;

/// Sink that logs each write for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// First `PREVIEW_LEN` bytes of `text`, cut on a char boundary
fn preview(text: &str) -> &str {
    if text.len() <= PREVIEW_LEN {
        return text;
    }
    let mut end = PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
impl ByteSink for LogSink {
    #[instrument(name = "log_sink_write", skip(self, buf), fields(sink = %self.name))]
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        let text = String::from_utf8_lossy(buf);
        info!(
            sink = %self.name,
            bytes = buf.len(),
            preview = preview(&text),
            "Bytes received"
        );
        Ok(buf.len())
    }

    fn as_text_sink(&self) -> Option<&dyn TextSink> {
        Some(self)
    }
}

#[async_trait]
impl TextSink for LogSink {
    #[instrument(name = "log_sink_write_str", skip(self, text), fields(sink = %self.name))]
    async fn write_str(&self, text: &str) -> Result<usize, ContractError> {
        info!(
            sink = %self.name,
            bytes = text.len(),
            preview = preview(text),
            "Text received"
        );
        Ok(text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let sink = LogSink::new("test_log");
        let result = ByteSink::write(&sink, b"hello").await;
        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_log_sink_write_str() {
        let sink = LogSink::new("test_log");
        let text = "ü".repeat(100);
        assert_eq!(sink.write_str(&text).await.unwrap(), text.len());
    }

    #[test]
    fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }

    #[test]
    fn test_preview_respects_char_boundary() {
        let text = "ü".repeat(40);
        let cut = preview(&text);
        assert!(cut.len() <= PREVIEW_LEN);
        assert!(text.starts_with(cut));
        assert_eq!(preview("short"), "short");
    }
}
