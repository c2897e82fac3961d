//! Record writer statistics.
//!
//! Counters are atomic so they can be read without taking the writer lock.
//!
//! ```rust
//! use firehose_core::{DestinationRegistry, RecordWriter, WriterConfig};
//!
//! let registry = DestinationRegistry::new();
//! let writer = RecordWriter::new(registry.supplier(), WriterConfig::new().max_bytes(4));
//! writer.put_record(b"abcd").unwrap();
//! writer.put_record(b"ef").unwrap();
//!
//! let stats = writer.stats();
//! assert_eq!(stats.records, 2);
//! assert_eq!(stats.bytes_written, 6);
//! assert_eq!(stats.batches_opened, 2);
//! assert_eq!(stats.batches_closed, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one [`RecordWriter`](crate::RecordWriter).
///
/// Values only ever increase.
#[derive(Debug, Default)]
pub struct WriterStats {
    /// Records accepted by a destination.
    records: AtomicU64,
    /// Bytes accepted by a destination, newlines included.
    bytes_written: AtomicU64,
    /// Destinations opened through the supplier.
    batches_opened: AtomicU64,
    /// Destinations closed, successfully or not.
    batches_closed: AtomicU64,
    /// Rotations triggered by the byte threshold.
    size_rotations: AtomicU64,
    /// Rotations triggered by the deadline.
    deadline_rotations: AtomicU64,
    /// Supplier, write and close failures.
    errors: AtomicU64,
}

impl WriterStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self, bytes: u64) {
        self.records.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_open(&self) {
        self.batches_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_close(&self) {
        self.batches_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_size_rotation(&self) {
        self.size_rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deadline_rotation(&self) {
        self.deadline_rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of records written.
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    /// Returns the number of bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of batches opened.
    pub fn batches_opened(&self) -> u64 {
        self.batches_opened.load(Ordering::Relaxed)
    }

    /// Returns the number of batches closed.
    pub fn batches_closed(&self) -> u64 {
        self.batches_closed.load(Ordering::Relaxed)
    }

    /// Returns the number of byte-threshold rotations.
    pub fn size_rotations(&self) -> u64 {
        self.size_rotations.load(Ordering::Relaxed)
    }

    /// Returns the number of deadline rotations.
    pub fn deadline_rotations(&self) -> u64 {
        self.deadline_rotations.load(Ordering::Relaxed)
    }

    /// Returns the number of failures seen.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records: self.records(),
            bytes_written: self.bytes_written(),
            batches_opened: self.batches_opened(),
            batches_closed: self.batches_closed(),
            size_rotations: self.size_rotations(),
            deadline_rotations: self.deadline_rotations(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`WriterStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Records written.
    pub records: u64,
    /// Bytes written.
    pub bytes_written: u64,
    /// Batches opened.
    pub batches_opened: u64,
    /// Batches closed.
    pub batches_closed: u64,
    /// Byte-threshold rotations.
    pub size_rotations: u64,
    /// Deadline rotations.
    pub deadline_rotations: u64,
    /// Failures seen.
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero() {
        let stats = WriterStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn record_operations() {
        let stats = WriterStats::new();
        stats.record_open();
        stats.record_write(5);
        stats.record_write(6);
        stats.record_size_rotation();
        stats.record_close();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.records, 2);
        assert_eq!(snapshot.bytes_written, 11);
        assert_eq!(snapshot.batches_opened, 1);
        assert_eq!(snapshot.batches_closed, 1);
        assert_eq!(snapshot.size_rotations, 1);
        assert_eq!(snapshot.deadline_rotations, 0);
    }
}
