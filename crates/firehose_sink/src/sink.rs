//! Byte sink trait definition.

use crate::error::SinkResult;
use crate::file::FileSink;
use crate::memory::MemorySink;
use std::io::Write;

/// An accumulating, closeable write target.
///
/// Sinks are **opaque byte stores**. Writes go through [`std::io::Write`];
/// [`bytes`](ByteSink::bytes) returns everything written so far and
/// [`close`](ByteSink::close) releases whatever the sink holds.
///
/// # Invariants
///
/// - `bytes` returns the concatenation of all successful writes, in order
/// - `bytes` does not disturb the position of subsequent writes
/// - Sinks must be `Send` so a batch can be handed across threads
///
/// # Implementors
///
/// - [`super::MemorySink`] - In-process buffer
/// - [`super::FileSink`] - Temporary file on disk
pub trait ByteSink: Write + Send {
    /// Returns a copy of everything written to the sink so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or the sink
    /// no longer has one.
    fn bytes(&mut self) -> SinkResult<Vec<u8>>;

    /// Closes the sink and releases its backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be released.
    fn close(&mut self) -> SinkResult<()>;
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn bytes(&mut self) -> SinkResult<Vec<u8>> {
        (**self).bytes()
    }

    fn close(&mut self) -> SinkResult<()> {
        (**self).close()
    }
}

/// Backing strategy for a sink chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Buffer in memory: fast, bounded by available memory.
    #[default]
    Memory,
    /// Spool to a temporary file: bounded by disk, keeps large payloads out of memory.
    File,
}

impl SinkKind {
    /// Opens a fresh sink of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if a temporary file cannot be created.
    pub fn open(self) -> SinkResult<Box<dyn ByteSink>> {
        Ok(match self {
            SinkKind::Memory => Box::new(MemorySink::new()),
            SinkKind::File => Box::new(FileSink::new()?),
        })
    }

    /// Returns a short name for this kind (for logging).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SinkKind::Memory => "memory",
            SinkKind::File => "file",
        }
    }
}
