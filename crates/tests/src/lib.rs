//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> writer -> sinks 的完整链路
//! - 多 sink 并发写入与错误传播
//! - 嵌套 writer 展平与文本写入等价性

#[cfg(test)]
mod contract_tests {
    use contracts::{ContractError, SinkType};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_required_params_snapshot() {
        assert!(SinkType::Memory.required_params().is_empty());
        assert_eq!(SinkType::File.required_params(), ["path"]);
        assert_eq!(SinkType::Network.required_params(), ["addr"]);
        assert_eq!(ContractError::ShortWrite.to_string(), "short write");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use async_trait::async_trait;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{downcast_sink, ByteSink, ContractError, SharedSink};
    use fanout::{create_writer, FanoutBuilder, FanoutWriter, MemorySink};

    const SAMPLE: &str = "This is a sample string";

    struct BrokenSink;

    #[async_trait]
    impl ByteSink for BrokenSink {
        async fn write(&self, _buf: &[u8]) -> Result<usize, ContractError> {
            Err(ContractError::sink_write("broken", "broken writer"))
        }
    }

    fn buffers(count: usize) -> Vec<Arc<MemorySink>> {
        (0..count)
            .map(|i| Arc::new(MemorySink::new(format!("buf{i}"))))
            .collect()
    }

    fn as_shared(sinks: &[Arc<MemorySink>]) -> Vec<SharedSink> {
        sinks.iter().map(|s| Arc::clone(s) as SharedSink).collect()
    }

    /// End-to-end test: TOML config -> ConfigLoader -> FanoutWriter -> file + memory sinks
    #[tokio::test]
    async fn test_e2e_config_to_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("tee.out");

        let toml = format!(
            r#"
chunk_size = 4

[[sinks]]
name = "mem"
sink_type = "memory"

[[sinks]]
name = "log"
sink_type = "log"

[[sinks]]
name = "file"
sink_type = "file"
[sinks.params]
path = "{}"
"#,
            out.display()
        );

        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.chunk_size, 4);

        let writer = create_writer(&blueprint.sinks).await.unwrap();
        assert_eq!(writer.len(), 3);

        let mut input = Cursor::new(SAMPLE.as_bytes().to_vec());
        let copied = writer
            .copy_from(&mut input, blueprint.chunk_size)
            .await
            .unwrap();
        assert_eq!(copied, SAMPLE.len() as u64);

        let mem = downcast_sink::<MemorySink>(&writer.sinks()[0]).unwrap();
        assert_eq!(mem.contents_lossy().await, SAMPLE);
        // 23 bytes in chunks of 4
        assert_eq!(mem.write_count(), 6);

        assert_eq!(tokio::fs::read_to_string(&out).await.unwrap(), SAMPLE);
    }

    /// Six buffers receive an identical copy of the stream
    #[tokio::test]
    async fn test_copy_to_six_buffers() {
        let bufs = buffers(6);
        let writer = FanoutWriter::new(as_shared(&bufs));

        let mut input = Cursor::new(SAMPLE.as_bytes().to_vec());
        let copied = writer.copy_from(&mut input, 8).await.unwrap();
        assert_eq!(copied, SAMPLE.len() as u64);

        for buf in &bufs {
            assert_eq!(buf.contents_lossy().await, SAMPLE);
        }
    }

    /// One broken sink among six buffers fails the copy
    #[tokio::test]
    async fn test_copy_with_broken_sink_fails() {
        let bufs = buffers(6);
        let mut sinks = as_shared(&bufs);
        sinks.insert(3, Arc::new(BrokenSink));
        let writer = FanoutWriter::new(sinks);

        let mut input = Cursor::new(SAMPLE.as_bytes().to_vec());
        let err = writer.copy_from(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
        assert!(err.to_string().contains("broken writer"));

        // Healthy sinks still got the chunk that failed elsewhere
        for buf in &bufs {
            assert_eq!(buf.contents_lossy().await, SAMPLE);
        }
    }

    /// Nested writers flatten into one level of sinks
    #[tokio::test]
    async fn test_nested_writers_flatten() {
        let bufs = buffers(4);
        let inner = FanoutWriter::new(as_shared(&bufs[..2]));
        let middle = FanoutWriter::new(vec![
            Arc::new(inner) as SharedSink,
            Arc::clone(&bufs[2]) as SharedSink,
        ]);

        let writer = FanoutBuilder::new()
            .sink(Arc::new(middle))
            .sink(Arc::clone(&bufs[3]) as SharedSink)
            .build()
            .await
            .unwrap();

        assert_eq!(writer.len(), 4);
        assert!(writer
            .sinks()
            .iter()
            .all(|s| downcast_sink::<FanoutWriter>(s).is_none()));

        assert_eq!(writer.write(b"flat").await.unwrap(), 4);
        for buf in &bufs {
            assert_eq!(buf.contents().await, b"flat");
            assert_eq!(buf.write_count(), 1);
        }
    }

    /// Text writes land the same bytes as byte writes
    #[tokio::test]
    async fn test_text_and_byte_writes_match() {
        let by_bytes = buffers(3);
        let by_text = buffers(3);

        let bytes_writer = FanoutWriter::new(as_shared(&by_bytes));
        let text_writer = FanoutWriter::new(as_shared(&by_text));

        let text = "héllo, wörld";
        assert_eq!(bytes_writer.write(text.as_bytes()).await.unwrap(), text.len());
        assert_eq!(text_writer.write_str(text).await.unwrap(), text.len());

        for (b, t) in by_bytes.iter().zip(&by_text) {
            assert_eq!(b.contents().await, t.contents().await);
            assert_eq!(t.text_write_count(), 1);
        }
    }

    /// A writer with no sinks accepts everything
    #[tokio::test]
    async fn test_empty_writer() {
        let writer = FanoutWriter::new(Vec::new());
        assert!(writer.is_empty());
        assert_eq!(writer.write(SAMPLE.as_bytes()).await.unwrap(), SAMPLE.len());
        assert_eq!(writer.write_str("").await.unwrap(), 0);

        let mut input = Cursor::new(SAMPLE.as_bytes().to_vec());
        assert_eq!(
            writer.copy_from(&mut input, 16).await.unwrap(),
            SAMPLE.len() as u64
        );
    }

    /// The aggregator summarizes a mix of outcomes
    #[tokio::test]
    async fn test_outcomes_aggregate() {
        let bufs = buffers(2);
        let mut sinks = as_shared(&bufs);
        sinks.push(Arc::new(BrokenSink));
        let failing = FanoutWriter::new(sinks);
        let healthy = FanoutWriter::new(as_shared(&bufs));

        let mut aggregator = observability::WriteStatsAggregator::new();
        for writer in [&healthy, &failing, &healthy] {
            let result = writer.write(b"abc").await;
            aggregator.update(3, 0.5, fanout::write_outcome(&result));
        }

        let summary = aggregator.summary();
        // Only successful writes count towards writes and bytes
        assert_eq!(summary.total_writes, 2);
        assert_eq!(summary.total_failures, 1);
        assert_eq!(summary.total_bytes, 6);
    }
}
