//! Builder - assembles a FanoutWriter from configuration and ready-made sinks

use std::sync::Arc;

use tracing::{info, instrument};

use contracts::{SharedSink, SinkConfig, SinkType};

use crate::error::FanoutError;
use crate::sinks::{FileSink, LogSink, MemorySink, NetworkSink, StdoutSink};
use crate::writer::FanoutWriter;

enum Entry {
    Config(SinkConfig),
    Sink(SharedSink),
}

/// Builder for creating a FanoutWriter
///
/// Sinks keep the order in which they were added, whether configured or
/// passed in directly.
#[derive(Default)]
pub struct FanoutBuilder {
    entries: Vec<Entry>,
}

impl FanoutBuilder {
    /// Create an empty FanoutBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink described by configuration
    pub fn config(mut self, config: SinkConfig) -> Self {
        self.entries.push(Entry::Config(config));
        self
    }

    /// Add several configured sinks
    pub fn configs(mut self, configs: impl IntoIterator<Item = SinkConfig>) -> Self {
        self.entries
            .extend(configs.into_iter().map(Entry::Config));
        self
    }

    /// Add an already constructed sink
    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.entries.push(Entry::Sink(sink));
        self
    }

    /// Create the configured sinks and build the writer
    #[instrument(name = "fanout_builder_build", skip(self), fields(entries = self.entries.len()))]
    pub async fn build(self) -> Result<FanoutWriter, FanoutError> {
        let mut sinks = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            match entry {
                Entry::Config(config) => sinks.push(create_sink(&config).await?),
                Entry::Sink(sink) => sinks.push(sink),
            }
        }

        let writer = FanoutWriter::new(sinks);
        info!(sinks = writer.len(), "Fan-out writer ready");
        Ok(writer)
    }
}

/// Create a sink from configuration
#[instrument(
    name = "fanout_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn create_sink(config: &SinkConfig) -> Result<SharedSink, FanoutError> {
    match config.sink_type {
        SinkType::Memory => Ok(Arc::new(MemorySink::new(&config.name))),
        SinkType::Log => Ok(Arc::new(LogSink::new(&config.name))),
        SinkType::Stdout => Ok(Arc::new(StdoutSink::new())),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| FanoutError::sink_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(sink))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| FanoutError::sink_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(sink))
        }
    }
}

/// Convenience function to create a writer from sink configs
#[instrument(name = "fanout_create_writer", skip(configs))]
pub async fn create_writer(configs: &[SinkConfig]) -> Result<FanoutWriter, FanoutError> {
    FanoutBuilder::new()
        .configs(configs.iter().cloned())
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::downcast_sink;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_writer_from_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tee.out");

        let configs = vec![
            SinkConfig::new("log", SinkType::Log),
            SinkConfig::new("mem", SinkType::Memory),
            SinkConfig::new("file", SinkType::File).with_param("path", path.display().to_string()),
        ];

        let writer = create_writer(&configs).await.unwrap();
        assert_eq!(writer.len(), 3);

        writer.write(b"configured").await.unwrap();

        let mem = downcast_sink::<MemorySink>(&writer.sinks()[1]).unwrap();
        assert_eq!(mem.contents().await, b"configured");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"configured");
    }

    #[tokio::test]
    async fn test_builder_keeps_insertion_order() {
        let direct = Arc::new(MemorySink::new("direct"));

        let writer = FanoutBuilder::new()
            .config(SinkConfig::new("first", SinkType::Memory))
            .sink(Arc::clone(&direct) as SharedSink)
            .config(SinkConfig::new("last", SinkType::Memory))
            .build()
            .await
            .unwrap();

        let names: Vec<_> = writer
            .sinks()
            .iter()
            .map(|s| downcast_sink::<MemorySink>(s).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["first", "direct", "last"]);
    }

    #[tokio::test]
    async fn test_builder_flattens_nested_writer() {
        let inner = FanoutBuilder::new()
            .config(SinkConfig::new("a", SinkType::Memory))
            .config(SinkConfig::new("b", SinkType::Memory))
            .build()
            .await
            .unwrap();

        let writer = FanoutBuilder::new()
            .sink(Arc::new(inner))
            .config(SinkConfig::new("c", SinkType::Memory))
            .build()
            .await
            .unwrap();

        assert_eq!(writer.len(), 3);
    }

    #[tokio::test]
    async fn test_file_sink_missing_path() {
        let result = create_sink(&SinkConfig::new("nopath", SinkType::File)).await;
        let err = result.err().unwrap();
        assert!(matches!(err, FanoutError::SinkCreation { .. }));
        assert!(err.to_string().contains("nopath"));
    }

    #[tokio::test]
    async fn test_empty_config_builds_empty_writer() {
        let writer = create_writer(&[]).await.unwrap();
        assert!(writer.is_empty());
        assert_eq!(writer.write(b"vacuous").await.unwrap(), 7);
    }
}
