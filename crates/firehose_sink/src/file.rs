//! Temp-file byte sink for batches too large to keep resident.

use crate::error::{SinkError, SinkResult};
use crate::sink::ByteSink;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "filebytesink_";
const TEMP_SUFFIX: &str = ".tmp";

/// A byte sink backed by a temporary file.
///
/// Writes are appended to the file. [`bytes`](ByteSink::bytes) reads the
/// whole file back without disturbing the write position, so writes and
/// reads may be interleaved freely.
///
/// # Lifecycle
///
/// - `close()` flushes, closes and deletes the temporary file
/// - After close, writes and `bytes()` fail with [`SinkError::Closed`]
/// - A second `close()` is a no-op
///
/// # Example
///
/// ```rust
/// use firehose_sink::{ByteSink, FileSink};
/// use std::io::Write;
///
/// let mut sink = FileSink::new().unwrap();
/// sink.write_all(b"spooled").unwrap();
/// assert_eq!(sink.bytes().unwrap(), b"spooled");
/// sink.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<NamedTempFile>,
}

impl FileSink {
    /// Creates a sink backed by a new file in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> SinkResult<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile()?;
        Ok(Self::from_temp(file))
    }

    /// Creates a sink backed by a new file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new_in(dir: &Path) -> SinkResult<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        Ok(Self::from_temp(file))
    }

    fn from_temp(file: NamedTempFile) -> Self {
        Self {
            path: file.path().to_path_buf(),
            file: Some(file),
        }
    }

    /// Returns the path of the backing file.
    ///
    /// The path no longer exists once the sink is closed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once the sink has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn file_mut(&mut self) -> SinkResult<&mut NamedTempFile> {
        self.file.as_mut().ok_or(SinkError::Closed)
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut().map_err(SinkError::into_io)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl ByteSink for FileSink {
    fn bytes(&mut self) -> SinkResult<Vec<u8>> {
        let file = self.file_mut()?;

        let cursor = file.stream_position()?;
        file.seek(SeekFrom::Start(0))?;

        let mut data = Vec::with_capacity(usize::try_from(cursor).unwrap_or(0));
        let read = file.read_to_end(&mut data);
        // Restore the write position even when the read failed.
        let restored = file.seek(SeekFrom::Start(cursor));

        read?;
        restored?;
        Ok(data)
    }

    fn close(&mut self) -> SinkResult<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()?;
        file.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn file_create_new() {
        let sink = FileSink::new().unwrap();
        assert!(sink.path().exists());
        assert!(!sink.is_closed());

        let name = sink.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(TEMP_SUFFIX));
    }

    #[test]
    fn file_create_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new_in(dir.path()).unwrap();
        assert_eq!(sink.path().parent().unwrap(), dir.path());
    }

    #[test]
    fn file_interleaved_bytes_keeps_cursor() {
        let mut sink = FileSink::new().unwrap();

        sink.write_all(b"hello").unwrap();
        assert_eq!(sink.bytes().unwrap(), b"hello");

        sink.write_all(b" world").unwrap();
        assert_eq!(sink.bytes().unwrap(), b"hello world");

        let position = sink.file_mut().unwrap().stream_position().unwrap();
        assert_eq!(position, 11);
    }

    #[test]
    fn file_close_removes_file() {
        let mut sink = FileSink::new().unwrap();
        sink.write_all(b"data").unwrap();
        let path = sink.path().to_path_buf();

        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(!path.exists());
    }

    #[test]
    fn file_close_twice_is_noop() {
        let mut sink = FileSink::new().unwrap();
        sink.close().unwrap();
        assert!(sink.close().is_ok());
    }

    #[test]
    fn file_use_after_close_fails() {
        let mut sink = FileSink::new().unwrap();
        sink.close().unwrap();

        assert!(matches!(sink.bytes(), Err(SinkError::Closed)));
        assert!(sink.write(b"late").is_err());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn file_empty_bytes() {
        let mut sink = FileSink::new().unwrap();
        assert!(sink.bytes().unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn file_bytes_tracks_every_write(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..16)
        ) {
            let mut sink = FileSink::new().unwrap();
            let mut expected = Vec::new();

            for chunk in &chunks {
                sink.write_all(chunk).unwrap();
                expected.extend_from_slice(chunk);
                prop_assert_eq!(sink.bytes().unwrap(), expected.clone());
            }

            let position = sink.file_mut().unwrap().stream_position().unwrap();
            prop_assert_eq!(position, expected.len() as u64);
            sink.close().unwrap();
        }
    }
}
