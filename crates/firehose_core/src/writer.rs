//! Rotating batch writer.

use crate::config::WriterConfig;
use crate::destination::Destination;
use crate::error::CoreResult;
use crate::stats::{StatsSnapshot, WriterStats};
use crate::supplier::Supplier;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Why a batch was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    /// The byte threshold was reached.
    Size,
    /// The batch outlived its deadline.
    Deadline,
    /// The caller asked for it.
    Close,
}

impl Rotation {
    fn as_str(self) -> &'static str {
        match self {
            Rotation::Size => "bytes",
            Rotation::Deadline => "deadline",
            Rotation::Close => "close",
        }
    }
}

/// State of the batch currently being filled.
///
/// `written_bytes` and `deadline` only mean something while `destination`
/// is present; they are reset together with it. A `deadline` of `None` on an
/// open batch means `duration` is too large to represent, so the batch never
/// rotates by time.
#[derive(Default)]
struct Batch {
    destination: Option<Box<dyn Destination>>,
    written_bytes: u64,
    deadline: Option<Instant>,
}

/// Groups records into batches and rotates the batch destination when a
/// threshold is crossed.
///
/// A batch is closed when either:
/// - at least `max_bytes` have been written to it (checked after each
///   write, so the crossing record stays in the batch), or
/// - the clock has passed its deadline (open time + `duration`; checked
///   before each write and by [`flush_if_threshold_reached`](Self::flush_if_threshold_reached)).
///
/// Rotation only closes the current destination. The next one is opened
/// lazily through the [`Supplier`] when the next record arrives.
///
/// # Concurrency
///
/// `put_record`, `flush_if_threshold_reached` and `close` take the same
/// lock for their whole duration, so they are strictly serialized. Share a
/// writer across threads with `Arc`. None of them may be called from inside
/// a supplier or destination of the same writer.
///
/// # Errors
///
/// Supplier, write and close failures are returned to the caller as they
/// happen; nothing is retried. After a write failure the destination stays
/// open. After a close failure the destination is dropped regardless, and
/// the next record opens a new one.
pub struct RecordWriter {
    config: WriterConfig,
    supplier: Box<dyn Supplier>,
    batch: Mutex<Batch>,
    stats: WriterStats,
}

impl fmt::Debug for RecordWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordWriter")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl RecordWriter {
    /// Creates a writer that opens each batch through `supplier`.
    ///
    /// No destination is opened until the first record arrives.
    pub fn new(supplier: impl Supplier + 'static, config: WriterConfig) -> Self {
        Self {
            config,
            supplier: Box::new(supplier),
            batch: Mutex::new(Batch::default()),
            stats: WriterStats::new(),
        }
    }

    /// Appends one record to the current batch.
    ///
    /// Rotates first if the current batch is past its deadline, opens a
    /// destination if none is open, writes the record (plus `\n` when
    /// configured), then rotates if the byte threshold has been reached.
    ///
    /// # Errors
    ///
    /// Returns the supplier's error if a destination cannot be opened, the
    /// destination's error if the write fails, or a close error from either
    /// rotation check.
    pub fn put_record(&self, record: &[u8]) -> CoreResult<()> {
        let mut batch = self.batch.lock();

        self.rotate_if_due(&mut batch)?;

        let destination = self.current_destination(&mut batch)?;
        let written = match self.write_record(&mut **destination, record) {
            Ok(written) => written,
            Err(err) => {
                self.stats.record_error();
                warn!(error = %err, len = record.len(), "failed to write record");
                return Err(err);
            }
        };

        batch.written_bytes += written;
        self.stats.record_write(written);
        trace!(len = written, batch_bytes = batch.written_bytes, "record written");

        self.rotate_if_due(&mut batch)
    }

    /// Rotates the current batch if a threshold has been reached, without
    /// writing anything.
    ///
    /// Call this periodically so a quiet stream still gets its batches
    /// closed on time. Does nothing when no batch is open.
    ///
    /// # Errors
    ///
    /// Returns the destination's close error.
    pub fn flush_if_threshold_reached(&self) -> CoreResult<()> {
        let mut batch = self.batch.lock();
        self.rotate_if_due(&mut batch)
    }

    /// Closes the current batch, if any.
    ///
    /// The writer stays usable: the next record opens a new batch. Closing
    /// with no open batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the destination's close error.
    pub fn close(&self) -> CoreResult<()> {
        let mut batch = self.batch.lock();
        self.rotate(&mut batch, Rotation::Close)
    }

    /// Returns true while a batch destination is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.batch.lock().destination.is_some()
    }

    /// Returns the bytes written to the open batch (0 when none is open).
    #[must_use]
    pub fn written_bytes(&self) -> u64 {
        self.batch.lock().written_bytes
    }

    /// Returns the writer's configuration.
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Returns a snapshot of the writer's counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the open destination, asking the supplier for one if needed.
    fn current_destination<'a>(
        &self,
        batch: &'a mut Batch,
    ) -> CoreResult<&'a mut Box<dyn Destination>> {
        let destination = match batch.destination.take() {
            Some(destination) => destination,
            None => self.open_batch(batch)?,
        };
        Ok(batch.destination.insert(destination))
    }

    fn open_batch(&self, batch: &mut Batch) -> CoreResult<Box<dyn Destination>> {
        let destination = self.supplier.supply().inspect_err(|err| {
            self.stats.record_error();
            warn!(error = %err, "supplier failed to open batch destination");
        })?;

        batch.written_bytes = 0;
        batch.deadline = self.config.clock.now().checked_add(self.config.duration);
        self.stats.record_open();
        debug!(
            deadline_in_ms = self.config.duration.as_millis() as u64,
            has_deadline = batch.deadline.is_some(),
            "opened batch"
        );
        Ok(destination)
    }

    fn write_record(&self, destination: &mut dyn Destination, record: &[u8]) -> CoreResult<u64> {
        if self.config.append_newline {
            let mut line = Vec::with_capacity(record.len() + 1);
            line.extend_from_slice(record);
            line.push(b'\n');
            destination.write_all(&line)?;
            Ok(line.len() as u64)
        } else {
            destination.write_all(record)?;
            Ok(record.len() as u64)
        }
    }

    fn due_rotation(&self, batch: &Batch) -> Option<Rotation> {
        batch.destination.as_ref()?;

        if batch.written_bytes >= self.config.max_bytes {
            return Some(Rotation::Size);
        }
        match batch.deadline {
            Some(deadline) if self.config.clock.now() > deadline => Some(Rotation::Deadline),
            _ => None,
        }
    }

    fn rotate_if_due(&self, batch: &mut Batch) -> CoreResult<()> {
        match self.due_rotation(batch) {
            Some(rotation) => self.rotate(batch, rotation),
            None => Ok(()),
        }
    }

    /// Closes and detaches the current destination.
    ///
    /// The slot is emptied before `close` runs, so a failing destination is
    /// never closed twice.
    fn rotate(&self, batch: &mut Batch, rotation: Rotation) -> CoreResult<()> {
        let Some(mut destination) = batch.destination.take() else {
            return Ok(());
        };
        let written_bytes = std::mem::take(&mut batch.written_bytes);
        batch.deadline = None;

        match rotation {
            Rotation::Size => self.stats.record_size_rotation(),
            Rotation::Deadline => self.stats.record_deadline_rotation(),
            Rotation::Close => {}
        }
        debug!(reason = rotation.as_str(), written_bytes, "rotating batch");

        let result = destination.close();
        self.stats.record_close();
        if let Err(err) = &result {
            self.stats.record_error();
            warn!(
                error = %err,
                reason = rotation.as_str(),
                written_bytes,
                "failed to close batch destination"
            );
        }
        result
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        let batch = self.batch.get_mut();
        if let Some(mut destination) = batch.destination.take() {
            if let Err(err) = destination.close() {
                warn!(error = %err, "failed to close batch destination on drop");
            }
        }
    }
}
