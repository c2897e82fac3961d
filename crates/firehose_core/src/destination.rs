//! Batch destinations.
//!
//! A destination is whatever a [`Supplier`](crate::Supplier) hands the
//! record writer for one batch: a raw sink, or a
//! [`DestinationStack`](crate::DestinationStack) of transforms over one.

use crate::error::CoreResult;
use firehose_sink::ByteSink;
use std::io::{self, Write};

/// A closeable write target for one batch.
///
/// # Invariants
///
/// - The record writer calls `close` exactly once per destination
/// - A destination is never written to after it has been closed
/// - Destinations must be `Send`; a batch may be closed on another thread
pub trait Destination: Write + Send {
    /// Finalizes the destination (flushes transforms, publishes or uploads
    /// its contents, releases resources).
    ///
    /// # Errors
    ///
    /// Returns an error if finalizing fails. The destination is considered
    /// closed either way.
    fn close(&mut self) -> CoreResult<()>;
}

impl<D: Destination + ?Sized> Destination for Box<D> {
    fn close(&mut self) -> CoreResult<()> {
        (**self).close()
    }
}

/// Adapts any [`ByteSink`] into a [`Destination`].
///
/// Closing the destination closes the sink; whatever the sink held is
/// released with it. Use [`RegisteredDestination`](crate::RegisteredDestination)
/// when the batch contents must outlive the close.
#[derive(Debug)]
pub struct SinkDestination<S> {
    sink: S,
}

impl<S: ByteSink> SinkDestination<S> {
    /// Wraps `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns a reference to the wrapped sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns a mutable reference to the wrapped sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Unwraps the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: ByteSink> Write for SinkDestination<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<S: ByteSink> Destination for SinkDestination<S> {
    fn close(&mut self) -> CoreResult<()> {
        self.sink.close()?;
        Ok(())
    }
}

/// Gzip layer: closing writes the gzip trailer into the inner writer.
///
/// The inner writer itself is left open; inside a
/// [`DestinationStack`](crate::DestinationStack) it is closed by the next
/// step of the unwind.
#[cfg(feature = "gzip")]
impl<W: Write + Send> Destination for flate2::write::GzEncoder<W> {
    fn close(&mut self) -> CoreResult<()> {
        self.try_finish()
            .map_err(|err| crate::error::CoreError::compression(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use firehose_sink::{FileSink, MemorySink};

    #[test]
    fn sink_destination_forwards_writes() {
        let mut destination = SinkDestination::new(MemorySink::new());
        destination.write_all(b"batch").unwrap();

        assert_eq!(destination.sink().len(), 5);
        assert_eq!(destination.sink_mut().bytes().unwrap(), b"batch");
        destination.close().unwrap();
    }

    #[test]
    fn sink_destination_closes_file_sink() {
        let mut destination = SinkDestination::new(FileSink::new().unwrap());
        destination.write_all(b"spooled").unwrap();
        let path = destination.sink().path().to_path_buf();

        destination.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn boxed_destination_closes_inner() {
        let mut destination: Box<dyn Destination> =
            Box::new(SinkDestination::new(FileSink::new().unwrap()));
        destination.write_all(b"x").unwrap();
        destination.close().unwrap();

        // The file sink refuses writes once closed.
        let err = destination.write(b"late").unwrap_err();
        assert_eq!(err.to_string(), "sink is closed");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_layer_finishes_stream() {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"compressed batch").unwrap();
        Destination::close(&mut encoder).unwrap();

        let compressed = encoder.get_ref().clone();
        let mut decoded = String::new();
        GzDecoder::new(&compressed[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "compressed batch");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_layer_reports_inner_failure() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut encoder = flate2::write::GzEncoder::new(Broken, flate2::Compression::default());
        let err = Destination::close(&mut encoder).unwrap_err();
        assert!(matches!(err, CoreError::Compression { .. }));
    }
}
