//! Pipeline orchestrator - reads input and fans it out to the sinks.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ContractError, TeeBlueprint};
use fanout::{write_outcome, FanoutWriter};
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sinks and chunk size
    pub blueprint: TeeBlueprint,

    /// Input file (None = stdin)
    pub input: Option<PathBuf>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until the input is exhausted
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let writer = fanout::create_writer(&self.config.blueprint.sinks)
            .await
            .context("Failed to create sinks")?;

        if writer.is_empty() {
            warn!("No sinks configured - input will be discarded");
        }

        let mut reader = self.open_input().await?;
        let mut stats = PipelineStats {
            active_sinks: writer.len(),
            ..Default::default()
        };

        let copy = copy_chunks(
            &writer,
            &mut reader,
            self.config.blueprint.chunk_size,
            &mut stats,
        );

        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, copy)
                .await
                .map_err(|_| CliError::Timeout {
                    secs: timeout.as_secs(),
                })??,
            None => copy.await?,
        }

        stats.duration = start_time.elapsed();
        Ok(stats)
    }

    async fn open_input(&self) -> Result<Box<dyn AsyncRead + Unpin + Send>, CliError> {
        match &self.config.input {
            Some(path) => {
                info!(input = %path.display(), "Reading from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| CliError::input_open(path.display().to_string(), e))?;
                Ok(Box::new(file))
            }
            None => {
                info!("Reading from stdin");
                Ok(Box::new(tokio::io::stdin()))
            }
        }
    }
}

/// Fan out `reader` chunk by chunk, stopping at the first failed write
async fn copy_chunks<R>(
    writer: &FanoutWriter,
    reader: &mut R,
    chunk_size: usize,
    stats: &mut PipelineStats,
) -> Result<(), CliError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut write_failed = false;
    let copied = writer
        .copy_from_with(reader, chunk_size, |len, latency_ms, result| {
            write_failed |= result.is_err();
            stats.record(len, latency_ms, write_outcome(result));
            if result.is_ok() && stats.chunks_written % 1000 == 0 {
                debug!(chunks = stats.chunks_written, bytes = stats.bytes_written, "Tee progress");
            }
        })
        .await;

    match copied {
        Ok(bytes) => {
            debug!(bytes, "Input exhausted");
            Ok(())
        }
        Err(e) if write_failed => Err(CliError::write_failed(stats.bytes_written, e)),
        // Reading the input failed
        Err(ContractError::Io(e)) => Err(CliError::Io(e)),
        Err(e) => Err(CliError::write_failed(stats.bytes_written, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkConfig, SinkType};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_pipeline_copies_file_to_all_sinks() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let content = "line one\nline two\n".repeat(50);
        tokio::fs::write(&input, &content).await.unwrap();

        let outputs: Vec<_> = (0..3).map(|i| dir.path().join(format!("out{i}.txt"))).collect();
        let blueprint = TeeBlueprint {
            chunk_size: 64,
            sinks: outputs
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    SinkConfig::new(format!("out{i}"), SinkType::File)
                        .with_param("path", p.display().to_string())
                })
                .collect(),
            ..Default::default()
        };

        let stats = Pipeline::new(PipelineConfig {
            blueprint,
            input: Some(input),
            timeout: Some(Duration::from_secs(10)),
            metrics_port: None,
        })
        .run()
        .await
        .unwrap();

        assert_eq!(stats.bytes_written, content.len() as u64);
        assert_eq!(stats.active_sinks, 3);
        for output in &outputs {
            assert_eq!(tokio::fs::read_to_string(output).await.unwrap(), content);
        }
    }

    #[tokio::test]
    async fn test_pipeline_missing_input() {
        let dir = tempdir().unwrap();
        let result = Pipeline::new(PipelineConfig {
            blueprint: TeeBlueprint::default(),
            input: Some(dir.path().join("missing.txt")),
            timeout: None,
            metrics_port: None,
        })
        .run()
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to open input"));
    }

    #[tokio::test]
    async fn test_copy_chunks_stops_on_short_write() {
        use fanout::sinks::{NetworkProtocol, NetworkSinkConfig};
        use fanout::{MemorySink, NetworkSink, SharedSink};
        use std::sync::Arc;

        // A datagram sink capped at one byte short-writes every 2-byte chunk
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let udp = NetworkSink::connect(
            "udp",
            NetworkSinkConfig {
                addr: receiver.local_addr().unwrap(),
                protocol: NetworkProtocol::Udp,
                max_packet_size: 1,
            },
        )
        .await
        .unwrap();

        let memory = Arc::new(MemorySink::new("mem"));
        let writer = FanoutWriter::new(vec![
            Arc::clone(&memory) as SharedSink,
            Arc::new(udp) as SharedSink,
        ]);
        let mut stats = PipelineStats::default();
        let mut reader: &[u8] = b"abcdef";

        let err = copy_chunks(&writer, &mut reader, 2, &mut stats)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::WriteFailed { bytes: 0, .. }));
        assert_eq!(stats.write_metrics.summary().total_failures, 1);
        assert_eq!(memory.contents().await, b"ab");
    }

    #[tokio::test]
    async fn test_copy_chunks_read_error_is_not_write_failure() {
        use std::pin::Pin;
        use std::task::{Context, Poll};
        use tokio::io::ReadBuf;

        struct FailingReader;

        impl AsyncRead for FailingReader {
            fn poll_read(
                self: Pin<&mut Self>,
                _cx: &mut Context<'_>,
                _buf: &mut ReadBuf<'_>,
            ) -> Poll<std::io::Result<()>> {
                Poll::Ready(Err(std::io::Error::other("disk gone")))
            }
        }

        let writer = FanoutWriter::new(vec![
            std::sync::Arc::new(fanout::MemorySink::new("mem")) as fanout::SharedSink,
        ]);
        let mut stats = PipelineStats::default();

        let err = copy_chunks(&writer, &mut FailingReader, 8, &mut stats)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(stats.chunks_written, 0);
    }
}
