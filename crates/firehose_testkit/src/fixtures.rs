//! Test fixtures and writer helpers.
//!
//! Provides a ready-made writer harness plus destinations and suppliers
//! that fail on demand.

use firehose_core::{
    CoreError, CoreResult, Destination, DestinationRegistry, MockClock, RecordWriter, Supplier,
    WriterConfig,
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A record writer wired to a registry and a mock clock.
pub struct TestWriter {
    /// Where closed batches are published.
    pub registry: DestinationRegistry,
    /// The writer's clock.
    pub clock: Arc<MockClock>,
    /// The writer under test.
    pub writer: RecordWriter,
}

impl TestWriter {
    /// Creates a harness writing plain batches.
    ///
    /// The clock in `config` is replaced with the harness clock.
    pub fn new(config: WriterConfig) -> Self {
        let registry = DestinationRegistry::new();
        let supplier = registry.supplier();
        Self::with_supplier(registry, supplier, config)
    }

    /// Creates a harness writing gzip-compressed batches.
    pub fn gzip(config: WriterConfig) -> Self {
        let registry = DestinationRegistry::new();
        let supplier = registry.gzip_supplier();
        Self::with_supplier(registry, supplier, config)
    }

    /// Creates a harness around a custom supplier publishing to `registry`.
    pub fn with_supplier(
        registry: DestinationRegistry,
        supplier: impl Supplier + 'static,
        config: WriterConfig,
    ) -> Self {
        let clock = Arc::new(MockClock::new());
        let writer = RecordWriter::new(supplier, config.clock(clock.clone()));
        Self {
            registry,
            clock,
            writer,
        }
    }

    /// Writes every record, panicking on the first failure.
    pub fn put_all<R: AsRef<[u8]>>(&self, records: &[R]) {
        for record in records {
            self.writer
                .put_record(record.as_ref())
                .expect("Failed to put record");
        }
    }

    /// Returns the published batches in the order they were opened.
    pub fn batches(&self) -> Vec<Vec<u8>> {
        let mut batches: Vec<(u64, Vec<u8>)> = self
            .registry
            .snapshot()
            .into_iter()
            .map(|(name, bytes)| {
                let sequence = u64::from_str_radix(&name, 16).expect("Batch name is not hex");
                (sequence, bytes)
            })
            .collect();
        batches.sort_by_key(|(sequence, _)| *sequence);
        batches.into_iter().map(|(_, bytes)| bytes).collect()
    }
}

/// A destination that fails on command.
///
/// Writes succeed until `fail_writes_after` bytes have been accepted;
/// `close` fails if `fail_close` is set. Every close is counted.
#[derive(Debug, Default)]
pub struct FailingDestination {
    accepted: usize,
    fail_writes_after: Option<usize>,
    fail_close: bool,
    closes: Arc<AtomicUsize>,
}

impl FailingDestination {
    /// Creates a destination that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any write that would take the total past `limit` bytes.
    #[must_use]
    pub fn fail_writes_after(mut self, limit: usize) -> Self {
        self.fail_writes_after = Some(limit);
        self
    }

    /// Makes `close` fail.
    #[must_use]
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Shares the close counter with `counter`.
    #[must_use]
    pub fn count_closes(mut self, counter: &Arc<AtomicUsize>) -> Self {
        self.closes = Arc::clone(counter);
        self
    }

    /// Returns how many times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Write for FailingDestination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(limit) = self.fail_writes_after {
            if self.accepted + buf.len() > limit {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "injected write failure",
                ));
            }
        }
        self.accepted += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Destination for FailingDestination {
    fn close(&mut self) -> CoreResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(io::Error::other("injected close failure").into())
        } else {
            Ok(())
        }
    }
}

struct RecordingInner {
    supplier: Box<dyn Supplier>,
    calls: AtomicUsize,
    pending_failures: AtomicUsize,
}

/// A supplier wrapper that counts calls and can fail the next few.
///
/// Clones share the same counters, so a test can keep one while the writer
/// owns another.
#[derive(Clone)]
pub struct RecordingSupplier {
    inner: Arc<RecordingInner>,
}

impl RecordingSupplier {
    /// Wraps `supplier`.
    pub fn new(supplier: impl Supplier + 'static) -> Self {
        Self {
            inner: Arc::new(RecordingInner {
                supplier: Box::new(supplier),
                calls: AtomicUsize::new(0),
                pending_failures: AtomicUsize::new(0),
            }),
        }
    }

    /// Fails the next `count` calls with a supplier error.
    pub fn fail_next(&self, count: usize) {
        self.inner.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Returns how many times `supply` has been called.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl Supplier for RecordingSupplier {
    fn supply(&self) -> CoreResult<Box<dyn Destination>> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .inner
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            })
            .is_ok();
        if failing {
            return Err(CoreError::supplier("injected supplier failure"));
        }
        self.inner.supplier.supply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_orders_batches_numerically() {
        let harness = TestWriter::new(WriterConfig::new().max_bytes(0));
        let records: Vec<String> = (0..17).map(|i| i.to_string()).collect();
        harness.put_all(&records);

        let batches = harness.batches();
        assert_eq!(batches.len(), 17);
        assert_eq!(batches[2], b"2");
        assert_eq!(batches[16], b"16");
    }

    #[test]
    fn failing_destination_counts_closes() {
        let mut destination = FailingDestination::new().fail_close();
        assert!(destination.close().is_err());
        assert_eq!(destination.close_count(), 1);
    }

    #[test]
    fn failing_destination_rejects_past_limit() {
        let mut destination = FailingDestination::new().fail_writes_after(4);
        destination.write_all(b"four").unwrap();
        assert!(destination.write_all(b"!").is_err());
    }

    #[test]
    fn recording_supplier_fails_then_recovers() {
        let registry = DestinationRegistry::new();
        let supplier = RecordingSupplier::new(registry.supplier());
        supplier.fail_next(2);

        assert!(supplier.supply().is_err());
        assert!(supplier.supply().is_err());
        assert!(supplier.supply().is_ok());
        assert_eq!(supplier.calls(), 3);
    }
}
