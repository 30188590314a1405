//! FanoutWriter - concurrent tee over a fixed list of sinks

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use contracts::{downcast_sink, ByteSink, ContractError, SharedSink, TextSink};
use observability::metrics::{record_fanout_write, WriteOutcome};

/// Payload shared read-only by every per-sink task of one call
#[derive(Clone)]
enum Payload {
    Bytes(Bytes),
    Text(Arc<str>),
}

impl Payload {
    fn len(&self) -> usize {
        match self {
            Payload::Bytes(buf) => buf.len(),
            Payload::Text(text) => text.len(),
        }
    }
}

/// Writer that duplicates each write to all of its sinks, concurrently
///
/// Similar to `tee(1)`, except that the per-sink writes of a call run as
/// separate tasks. A call returns once every sink has finished: with the
/// payload length if all of them accepted it in full, or with the error of
/// the first failing sink (by position) otherwise. Sinks that succeeded are
/// not rolled back.
///
/// The sink list is fixed at construction and always flat: a `FanoutWriter`
/// passed as a sink is replaced by its own sinks.
#[derive(Clone, Default)]
pub struct FanoutWriter {
    sinks: Vec<SharedSink>,
}

impl FanoutWriter {
    /// Create a writer over `sinks`, flattening nested fan-out writers
    pub fn new<I>(sinks: I) -> Self
    where
        I: IntoIterator<Item = SharedSink>,
    {
        let mut flat = Vec::new();
        for sink in sinks {
            // One level is enough: a FanoutWriter never holds another one
            if let Some(inner) = downcast_sink::<FanoutWriter>(&sink) {
                flat.extend(inner.sinks.iter().cloned());
                continue;
            }
            flat.push(sink);
        }

        Self { sinks: flat }
    }

    /// Leaf sinks, in dispatch order
    pub fn sinks(&self) -> &[SharedSink] {
        &self.sinks
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Write `buf` to every sink
    ///
    /// The payload is copied once and shared by all sink tasks.
    ///
    /// # Errors
    /// - The first sink error, by sink position
    /// - `ContractError::ShortWrite` if a sink accepted fewer bytes than `buf.len()`
    /// - `ContractError::TaskFailed` if a sink task panicked
    pub async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        self.dispatch(Payload::Bytes(Bytes::copy_from_slice(buf)))
            .await
    }

    /// Write an owned buffer to every sink without copying it
    pub async fn write_bytes(&self, buf: Bytes) -> Result<usize, ContractError> {
        self.dispatch(Payload::Bytes(buf)).await
    }

    /// Write `text` to every sink
    ///
    /// Sinks with native text support receive the string directly; the rest
    /// receive its UTF-8 bytes. The returned count is `text.len()`.
    pub async fn write_str(&self, text: &str) -> Result<usize, ContractError> {
        self.dispatch(Payload::Text(Arc::from(text))).await
    }

    /// Copy `reader` to every sink until EOF
    ///
    /// Reads up to `chunk_size` bytes at a time and fans out each chunk.
    /// Stops at the first failed chunk. Returns the number of bytes
    /// delivered to all sinks.
    pub async fn copy_from<R>(&self, reader: &mut R, chunk_size: usize) -> Result<u64, ContractError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.copy_from_with(reader, chunk_size, |_, _, _| {}).await
    }

    /// Like [`copy_from`](Self::copy_from), calling `on_chunk` after every
    /// fan-out with the chunk length, its latency in milliseconds and the
    /// write result. The hook also sees the failing chunk.
    #[instrument(name = "fanout_copy", skip(self, reader, on_chunk), fields(sinks = self.sinks.len()))]
    pub async fn copy_from_with<R, F>(
        &self,
        reader: &mut R,
        chunk_size: usize,
        mut on_chunk: F,
    ) -> Result<u64, ContractError>
    where
        R: AsyncRead + Unpin + ?Sized,
        F: FnMut(usize, f64, &Result<usize, ContractError>),
    {
        let chunk_size = chunk_size.max(1);
        let mut buf = BytesMut::with_capacity(chunk_size);
        let mut total: u64 = 0;

        loop {
            buf.resize(chunk_size, 0);
            let n = reader.read(&mut buf[..]).await?;
            if n == 0 {
                break;
            }
            buf.truncate(n);

            // Handed to the sink tasks without another copy
            let chunk = buf.split().freeze();
            let started = Instant::now();
            let result = self.write_bytes(chunk).await;
            on_chunk(n, started.elapsed().as_secs_f64() * 1000.0, &result);
            result?;
            total += n as u64;
        }

        debug!(bytes = total, "Copy finished");
        Ok(total)
    }

    #[instrument(
        name = "fanout_write",
        skip(self, payload),
        fields(sinks = self.sinks.len(), bytes = payload.len())
    )]
    async fn dispatch(&self, payload: Payload) -> Result<usize, ContractError> {
        let expected = payload.len();
        let started = Instant::now();

        let mut tasks = JoinSet::new();
        for (index, sink) in self.sinks.iter().enumerate() {
            let sink = Arc::clone(sink);
            let payload = payload.clone();
            tasks.spawn(async move { (index, write_to_sink(sink, payload).await) });
        }

        let mut slots: Vec<Option<Result<(), ContractError>>> =
            self.sinks.iter().map(|_| None).collect();
        let mut aborted: Option<String> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => {
                    warn!(error = %e, "Sink write task aborted");
                    aborted.get_or_insert_with(|| e.to_string());
                }
            }
        }

        let result = first_failure(slots, aborted).map_or(Ok(expected), Err);
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let outcome = write_outcome(&result);

        record_fanout_write(self.sinks.len(), expected, latency_ms, outcome);
        match &result {
            Ok(_) => debug!(latency_ms, "Fan-out write complete"),
            Err(e) => warn!(error = %e, latency_ms, "Fan-out write failed"),
        }

        result
    }
}

/// Write the whole payload to one sink
async fn write_to_sink(sink: SharedSink, payload: Payload) -> Result<(), ContractError> {
    let expected = payload.len();
    let written = match &payload {
        Payload::Bytes(buf) => sink.write(buf).await?,
        Payload::Text(text) => match sink.as_text_sink() {
            Some(text_sink) => text_sink.write_str(text).await?,
            None => sink.write(text.as_bytes()).await?,
        },
    };

    if written != expected {
        return Err(ContractError::ShortWrite);
    }
    Ok(())
}

/// Scan outcome slots in sink order; an empty slot is a task that never reported
fn first_failure(
    slots: Vec<Option<Result<(), ContractError>>>,
    aborted: Option<String>,
) -> Option<ContractError> {
    slots.into_iter().find_map(|slot| match slot {
        Some(Ok(())) => None,
        Some(Err(e)) => Some(e),
        None => Some(ContractError::task_failed(
            aborted
                .clone()
                .unwrap_or_else(|| "task did not report".to_string()),
        )),
    })
}

/// Metrics classification of a write result
pub fn write_outcome(result: &Result<usize, ContractError>) -> WriteOutcome {
    match result {
        Ok(_) => WriteOutcome::Success,
        Err(ContractError::ShortWrite) => WriteOutcome::ShortWrite,
        Err(ContractError::TaskFailed { .. }) => WriteOutcome::TaskFailed,
        Err(_) => WriteOutcome::SinkError,
    }
}

impl fmt::Debug for FanoutWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutWriter")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl FromIterator<SharedSink> for FanoutWriter {
    fn from_iter<I: IntoIterator<Item = SharedSink>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[async_trait]
impl ByteSink for FanoutWriter {
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        self.dispatch(Payload::Bytes(Bytes::copy_from_slice(buf)))
            .await
    }

    fn as_text_sink(&self) -> Option<&dyn TextSink> {
        Some(self)
    }
}

#[async_trait]
impl TextSink for FanoutWriter {
    async fn write_str(&self, text: &str) -> Result<usize, ContractError> {
        self.dispatch(Payload::Text(Arc::from(text))).await
    }
}
