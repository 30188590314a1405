//! Fan-out 指标收集模块
//!
//! 记录每次 fan-out 写入的聚合结果（不区分具体 sink）。

use metrics::{counter, gauge, histogram};

/// 写入结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 所有 sink 均完整写入
    Success,
    /// 某个 sink 返回错误
    SinkError,
    /// 某个 sink 写入字节数不足
    ShortWrite,
    /// 写入任务异常终止
    TaskFailed,
}

impl WriteOutcome {
    /// 指标标签值
    pub fn as_label(&self) -> &'static str {
        match self {
            WriteOutcome::Success => "success",
            WriteOutcome::SinkError => "sink_error",
            WriteOutcome::ShortWrite => "short_write",
            WriteOutcome::TaskFailed => "task_failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success)
    }
}

/// 记录一次 fan-out 写入
///
/// 每次 `FanoutWriter` 写入结束后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_fanout_write, WriteOutcome};
///
/// record_fanout_write(4, 1024, 2.5, WriteOutcome::Success);
/// ```
pub fn record_fanout_write(sinks: usize, bytes: usize, latency_ms: f64, outcome: WriteOutcome) {
    // 写入计数器
    counter!("fanout_writes_total", "outcome" => outcome.as_label()).increment(1);

    // 当前 sink 数量
    gauge!("fanout_sinks").set(sinks as f64);

    // 写入延迟
    histogram!("fanout_write_latency_ms").record(latency_ms);

    if outcome.is_success() {
        counter!("fanout_bytes_total").increment(bytes as u64);
    } else {
        counter!("fanout_write_failures_total", "outcome" => outcome.as_label()).increment(1);
    }
}

/// 写入统计聚合器
///
/// 用于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct WriteStatsAggregator {
    /// 成功写入次数
    total_writes: u64,
    /// 失败写入次数
    total_failures: u64,
    /// 成功写入的总字节数
    total_bytes: u64,
    /// 延迟统计
    latency_stats: RunningStats,
    /// 单次写入大小统计
    size_stats: RunningStats,
}

impl WriteStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次写入
    pub fn update(&mut self, bytes: usize, latency_ms: f64, outcome: WriteOutcome) {
        self.latency_stats.push(latency_ms);

        if outcome.is_success() {
            self.total_writes += 1;
            self.total_bytes += bytes as u64;
            self.size_stats.push(bytes as f64);
        } else {
            self.total_failures += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> WriteSummary {
        let attempts = self.total_writes + self.total_failures;
        WriteSummary {
            total_writes: self.total_writes,
            total_failures: self.total_failures,
            total_bytes: self.total_bytes,
            failure_rate: if attempts > 0 {
                self.total_failures as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            write_size: StatsSummary::from(&self.size_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub total_writes: u64,
    pub total_failures: u64,
    pub total_bytes: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub write_size: StatsSummary,
}

impl std::fmt::Display for WriteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fan-out Write Summary ===")?;
        writeln!(f, "Writes: {}", self.total_writes)?;
        writeln!(
            f,
            "Failures: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Bytes: {}", self.total_bytes)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Write size (bytes): {}", self.write_size)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = WriteStatsAggregator::new();

        aggregator.update(100, 1.0, WriteOutcome::Success);
        aggregator.update(300, 3.0, WriteOutcome::Success);
        aggregator.update(200, 2.0, WriteOutcome::ShortWrite);
        aggregator.update(200, 2.0, WriteOutcome::SinkError);

        let summary = aggregator.summary();
        assert_eq!(summary.total_writes, 2);
        assert_eq!(summary.total_failures, 2);
        assert_eq!(summary.total_bytes, 400);
        assert!((summary.failure_rate - 50.0).abs() < 1e-10);
        assert_eq!(summary.latency_ms.count, 4);
        assert!((summary.write_size.mean - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_reset() {
        let mut aggregator = WriteStatsAggregator::new();
        aggregator.update(10, 0.5, WriteOutcome::Success);
        aggregator.reset();

        let summary = aggregator.summary();
        assert_eq!(summary.total_writes, 0);
        assert_eq!(summary.failure_rate, 0.0);
        assert_eq!(summary.latency_ms.to_string(), "N/A");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(WriteOutcome::Success.as_label(), "success");
        assert_eq!(WriteOutcome::ShortWrite.as_label(), "short_write");
        assert!(!WriteOutcome::TaskFailed.is_success());
    }

    #[test]
    fn test_record_without_recorder() {
        // No recorder installed: the facade must be a no-op
        record_fanout_write(3, 42, 0.7, WriteOutcome::Success);
        record_fanout_write(3, 42, 0.7, WriteOutcome::SinkError);
    }
}
