//! StdoutSink - writes to process standard output

use async_trait::async_trait;
use contracts::{ByteSink, ContractError};
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Sink that forwards writes to stdout, flushing after each one
pub struct StdoutSink {
    stdout: Mutex<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteSink for StdoutSink {
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(buf)
            .await
            .map_err(|e| ContractError::sink_write("stdout", e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ContractError::sink_write("stdout", e.to_string()))?;
        Ok(buf.len())
    }
}
