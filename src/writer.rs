use crate::{
    channel::{DeviceChannel, StateSink},
    codec::RegisterCodec,
    error::{WriteError, WriteResult},
    field::WritableField,
    merge::WriteMerger,
    types::{AccessMode, WritePolicy, WriteReceipt, WriterMetrics},
    value::LogicalValue,
};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Externally-facing write operation: encode, merge, issue, confirm.
///
/// Field configuration is immutable and every write owns its buffers, so
/// the writer needs no locking of its own. The device channel is the shared
/// ordered resource; serializing overlapping writes is its job.
pub struct RegisterWriter {
    channel: Arc<dyn DeviceChannel>,
    sink: Option<Arc<dyn StateSink>>,
    policy: WritePolicy,
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    last_avg_response_time_ms: AtomicU64,
}

impl RegisterWriter {
    pub fn new(channel: Arc<dyn DeviceChannel>, policy: WritePolicy) -> Self {
        Self {
            channel,
            sink: None,
            policy,
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            last_avg_response_time_ms: AtomicU64::new(0),
        }
    }

    /// Attach a state sink to notify on confirmed writes.
    pub fn with_sink(mut self, sink: Arc<dyn StateSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run a device operation with timeout, unified error handling and
    /// metrics.
    #[inline]
    async fn run_op<T, F>(&self, op_timeout: u64, op_label: &'static str, op: F) -> WriteResult<T>
    where
        F: Future<Output = WriteResult<T>>,
    {
        let start_ts = Instant::now();
        let duration = Duration::from_millis(op_timeout);
        let res = match timeout(duration, op).await {
            Ok(inner) => inner,
            Err(_elapsed) => {
                warn!(op = op_label, "Operation timeout");
                Err(WriteError::Timeout(duration))
            }
        };
        let elapsed_ms = start_ts.elapsed().as_millis() as u64;

        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match &res {
            Ok(_) => {
                self.successful_requests.fetch_add(1, Ordering::Relaxed);
                let prev = self.last_avg_response_time_ms.load(Ordering::Acquire);
                let new_avg = if prev == 0 {
                    elapsed_ms
                } else {
                    (prev.saturating_mul(9) + elapsed_ms) / 10
                };
                self.last_avg_response_time_ms
                    .store(new_avg, Ordering::Release);
            }
            Err(e) => {
                warn!(op = op_label, err = %e, "Device operation failed");
                self.failed_requests.fetch_add(1, Ordering::Relaxed);
            }
        }

        res
    }

    /// Write a logical value into a field.
    ///
    /// The pipeline is a single linear pass: encode the value, merge it with
    /// the dependency block (fetching unknown offsets at most once), issue
    /// one combined write. On a positive acknowledgement the state sink
    /// receives `display` together with the field's own encoded words; on
    /// any failure nothing caller-visible changes.
    #[instrument(level = "debug", skip_all, fields(key = %field.key()))]
    pub async fn write(
        &self,
        field: &WritableField,
        value: LogicalValue,
        display: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> WriteResult<WriteReceipt> {
        if !matches!(
            field.access_mode(),
            AccessMode::Write | AccessMode::ReadWrite
        ) {
            return Err(WriteError::Validation(format!(
                "Field '{}' is not writeable",
                field.key()
            )));
        }

        let words = RegisterCodec::encode(&value, field.encoding())?;
        let raw = words.clone();

        let needs_fetch = field.dependency().is_some_and(|block| block.needs_fetch());
        let (address, final_words) = if needs_fetch {
            self.run_op(
                self.policy.read_timeout_ms.max(1),
                "ReadDependencyBlock",
                WriteMerger::merge(field, words, self.channel.as_ref()),
            )
            .await?
        } else {
            // No device read involved; the merge is plain buffer work.
            WriteMerger::merge(field, words, self.channel.as_ref()).await?
        };

        debug!(
            address = format_args!("{:#06x}", address),
            length = final_words.len(),
            "issuing combined write"
        );

        let effective_timeout_ms = timeout_ms.unwrap_or(self.policy.write_timeout_ms).max(1);
        let acknowledged = self
            .run_op(
                effective_timeout_ms,
                "WriteRegisters",
                self.channel.write_registers(address, &final_words),
            )
            .await?;
        if acknowledged == 0 {
            return Err(WriteError::DeviceWrite(format!(
                "Device acknowledged 0 of {} register(s)",
                final_words.len()
            )));
        }

        if let (Some(sink), Some(display)) = (&self.sink, display) {
            sink.apply(display, &raw);
        }

        Ok(WriteReceipt {
            address,
            words: final_words,
            acknowledged,
        })
    }

    /// Snapshot of the writer's request metrics.
    pub fn metrics(&self) -> WriterMetrics {
        WriterMetrics {
            total_requests: self.total_requests.load(Ordering::Acquire),
            successful_requests: self.successful_requests.load(Ordering::Acquire),
            failed_requests: self.failed_requests.load(Ordering::Acquire),
            average_response_time: Duration::from_millis(
                self.last_avg_response_time_ms.load(Ordering::Acquire),
            ),
        }
    }
}
