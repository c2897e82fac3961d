//! In-memory byte sink.

use crate::error::SinkResult;
use crate::sink::ByteSink;
use std::io::{self, Write};

/// An in-memory byte sink.
///
/// This sink stores all written data in a growable buffer and is suitable for:
/// - Unit tests
/// - Small batches that comfortably fit in memory
///
/// Closing releases nothing; [`bytes`](ByteSink::bytes) keeps working after
/// close and always returns a copy.
///
/// # Example
///
/// ```rust
/// use firehose_sink::{ByteSink, MemorySink};
/// use std::io::Write;
///
/// let mut sink = MemorySink::new();
/// sink.write_all(b"test data").unwrap();
/// assert_eq!(sink.len(), 9);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
}

impl MemorySink {
    /// Creates a new empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new memory sink with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSink for MemorySink {
    fn bytes(&mut self) -> SinkResult<Vec<u8>> {
        Ok(self.buffer.clone())
    }

    fn close(&mut self) -> SinkResult<()> {
        // Nothing to release
        Ok(())
    }
}
