//! Tee run statistics.

use std::time::Duration;

use observability::{WriteOutcome, WriteStatsAggregator};

/// Statistics from a tee run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Bytes delivered to every sink
    pub bytes_written: u64,

    /// Chunks fanned out successfully
    pub chunks_written: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of sinks written to
    pub active_sinks: usize,

    /// Per-write aggregates
    pub write_metrics: WriteStatsAggregator,
}

impl PipelineStats {
    /// Record the outcome of one fan-out write
    pub fn record(&mut self, bytes: usize, latency_ms: f64, outcome: WriteOutcome) {
        if outcome.is_success() {
            self.bytes_written += bytes as u64;
            self.chunks_written += 1;
        }
        self.write_metrics.update(bytes, latency_ms, outcome);
    }

    /// Throughput in bytes per second
    pub fn bytes_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary to stderr
    pub fn print_summary(&self) {
        let summary = self.write_metrics.summary();

        eprintln!("\n=== Tee Statistics ===");
        eprintln!("  Duration: {:.2}s", self.duration.as_secs_f64());
        eprintln!("  Sinks: {}", self.active_sinks);
        eprintln!("  Bytes written: {}", self.bytes_written);
        eprintln!("  Chunks written: {}", self.chunks_written);
        eprintln!("  Throughput: {:.0} B/s", self.bytes_per_sec());
        eprintln!("  Failed writes: {}", summary.total_failures);
        eprintln!("  Write latency (ms): {}", summary.latency_ms);
        eprintln!("  Chunk size (bytes): {}", summary.write_size);
        eprintln!();
    }
}
