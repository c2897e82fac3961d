//! In-memory publish target for closed batches.
//!
//! A [`DestinationRegistry`] hands out sequential batch names and collects
//! the bytes of every [`RegisteredDestination`] when it closes. The
//! sequence is owned by the registry instance, so independent writers (and
//! independent tests) never share names.

use crate::destination::Destination;
use crate::error::CoreResult;
use crate::supplier::Supplier;
use firehose_sink::{ByteSink, MemorySink, SinkKind};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct RegistryInner {
    sequence: AtomicU64,
    batches: Mutex<BTreeMap<String, Vec<u8>>>,
}

/// Collects published batches by name.
///
/// Cloning is cheap; clones share the same names and contents.
///
/// # Example
///
/// ```rust
/// use firehose_core::{Destination, DestinationRegistry, MemoryDestination};
/// use std::io::Write;
///
/// let registry = DestinationRegistry::new();
/// let mut destination = MemoryDestination::new(&registry);
/// destination.write_all(b"Hello, Firehose!").unwrap();
/// destination.close().unwrap();
///
/// assert_eq!(registry.get("1").unwrap(), b"Hello, Firehose!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DestinationRegistry {
    inner: Arc<RegistryInner>,
}

impl DestinationRegistry {
    /// Creates an empty registry whose first name is `"1"`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next batch name: the sequence number in lower-case hex,
    /// starting at 1.
    pub fn next_name(&self) -> String {
        let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{sequence:x}")
    }

    /// Stores `bytes` under `name`, replacing any earlier contents.
    pub fn publish(&self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        tracing::trace!(name = %name, len = bytes.len(), "publishing batch");
        self.inner.batches.lock().insert(name, bytes);
    }

    /// Returns a copy of the batch published under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.batches.lock().get(name).cloned()
    }

    /// Returns the published names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.batches.lock().keys().cloned().collect()
    }

    /// Returns a copy of every published batch.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.inner.batches.lock().clone()
    }

    /// Returns the number of published batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.batches.lock().len()
    }

    /// Returns true if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.batches.lock().is_empty()
    }

    /// Drops every published batch and restarts the sequence at 1.
    pub fn clear(&self) {
        let mut batches = self.inner.batches.lock();
        batches.clear();
        self.inner.sequence.store(0, Ordering::SeqCst);
    }

    /// Returns a supplier that opens a [`MemoryDestination`] per batch.
    pub fn supplier(&self) -> impl Supplier + 'static {
        let registry = self.clone();
        move || -> CoreResult<Box<dyn Destination>> {
            Ok(Box::new(MemoryDestination::new(&registry)))
        }
    }

    /// Returns a supplier that opens a registered destination over a sink
    /// of the given kind.
    pub fn supplier_for(&self, kind: SinkKind) -> impl Supplier + 'static {
        let registry = self.clone();
        move || -> CoreResult<Box<dyn Destination>> {
            let sink = kind.open()?;
            Ok(Box::new(RegisteredDestination::with_sink(&registry, sink)))
        }
    }

    /// Returns a supplier that gzips each batch into a [`MemoryDestination`].
    #[cfg(feature = "gzip")]
    pub fn gzip_supplier(&self) -> impl Supplier + 'static {
        let registry = self.clone();
        move || -> CoreResult<Box<dyn Destination>> {
            Ok(Box::new(crate::stack::DestinationStack::gzip_over(
                MemoryDestination::new(&registry),
            )))
        }
    }
}

/// A destination that publishes its sink's contents to a
/// [`DestinationRegistry`] when closed.
///
/// The name is taken from the registry at construction, so names follow
/// the order in which destinations are opened.
#[derive(Debug)]
pub struct RegisteredDestination<S = MemorySink> {
    name: String,
    sink: S,
    registry: DestinationRegistry,
}

/// A registered destination buffering in memory.
pub type MemoryDestination = RegisteredDestination<MemorySink>;

impl RegisteredDestination<MemorySink> {
    /// Creates a memory-backed destination named by `registry`.
    #[must_use]
    pub fn new(registry: &DestinationRegistry) -> Self {
        Self::with_sink(registry, MemorySink::new())
    }
}

impl<S: ByteSink> RegisteredDestination<S> {
    /// Creates a destination over `sink`, named by `registry`.
    pub fn with_sink(registry: &DestinationRegistry, sink: S) -> Self {
        Self {
            name: registry.next_name(),
            sink,
            registry: registry.clone(),
        }
    }

    /// Returns the name this destination publishes under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S: ByteSink> Write for RegisteredDestination<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<S: ByteSink> Destination for RegisteredDestination<S> {
    fn close(&mut self) -> CoreResult<()> {
        let bytes = self.sink.bytes()?;
        self.registry.publish(self.name.clone(), bytes);
        self.sink.close()?;
        Ok(())
    }
}
