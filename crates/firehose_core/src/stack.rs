//! Layered destinations.
//!
//! A [`DestinationStack`] lets a supplier put transforms (compression,
//! checksumming, encryption) in front of a raw sink while the record writer
//! keeps seeing a single `write`/`close` surface.
//!
//! ```text
//! push(sink)  ──► handle ──► GzEncoder::new(handle) ──► push(encoder)
//!
//! write: ──► encoder ──► handle ──► sink
//! close: encoder.close()  then  sink.close()      (reverse push order)
//! ```

use crate::destination::Destination;
use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

type SharedDestination = Arc<Mutex<Box<dyn Destination>>>;

/// Shared write access to a layer pushed onto a [`DestinationStack`].
///
/// Returned by [`DestinationStack::push`] so the next layer can wrap the
/// one just pushed. The stack keeps its own reference and is the only one
/// that closes the layer.
#[derive(Clone)]
pub struct StackHandle {
    layer: SharedDestination,
}

impl fmt::Debug for StackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackHandle").finish_non_exhaustive()
    }
}

impl Write for StackHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.layer.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.layer.lock().flush()
    }
}

/// An ordered stack of destinations acting as one.
///
/// Writes go to the most recently pushed layer. Closing unwinds every layer
/// in reverse push order, so an outer transform finishes its stream before
/// the sink underneath it is closed.
///
/// # Preconditions
///
/// Push at least one layer before writing. Writing to an empty stack
/// (never pushed, or already closed) fails with
/// [`io::ErrorKind::NotConnected`]. Closing an empty stack succeeds.
///
/// # Example
///
/// ```rust
/// use firehose_core::{Destination, DestinationStack, SinkDestination, MemorySink};
/// use std::io::Write;
///
/// let mut stack = DestinationStack::new();
/// let sink = stack.push(SinkDestination::new(MemorySink::new()));
/// stack.push(flate2::write::GzEncoder::new(sink, flate2::Compression::default()));
///
/// stack.write_all(b"compressed").unwrap();
/// stack.close().unwrap();
/// ```
#[derive(Default)]
pub struct DestinationStack {
    /// Layers in push order; the last one is the write target.
    layers: Vec<SharedDestination>,
}

impl fmt::Debug for DestinationStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationStack")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl DestinationStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `destination` and makes it the write target.
    ///
    /// Returns a handle to the same layer for wrapping by the next one.
    pub fn push<D: Destination + 'static>(&mut self, destination: D) -> StackHandle {
        let layer: SharedDestination = Arc::new(Mutex::new(Box::new(destination)));
        self.layers.push(Arc::clone(&layer));
        StackHandle { layer }
    }

    /// Builds a two-layer stack that gzips everything written into `inner`.
    #[cfg(feature = "gzip")]
    pub fn gzip_over<D: Destination + 'static>(inner: D) -> Self {
        let mut stack = Self::new();
        let handle = stack.push(inner);
        stack.push(flate2::write::GzEncoder::new(
            handle,
            flate2::Compression::default(),
        ));
        stack
    }

    /// Returns the number of layers still held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if nothing is pushed (or the stack was closed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Write for DestinationStack {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.layers.last() {
            Some(top) => top.lock().write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "write to destination stack with no layers",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.layers.last() {
            Some(top) => top.lock().flush(),
            None => Ok(()),
        }
    }
}

impl Destination for DestinationStack {
    fn close(&mut self) -> CoreResult<()> {
        let mut failures = Vec::new();
        while let Some(layer) = self.layers.pop() {
            if let Err(err) = layer.lock().close() {
                failures.push(err);
            }
        }
        CoreError::join(failures)
    }
}
