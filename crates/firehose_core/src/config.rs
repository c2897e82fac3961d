//! Record writer configuration.

use crate::clock::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default byte threshold for a batch (1 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

/// Default time threshold for a batch.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);

/// Configuration for a [`RecordWriter`](crate::RecordWriter).
///
/// Moved into the writer at construction and never changed afterwards.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Rotate once a batch holds at least this many bytes.
    ///
    /// Checked after each write, so the record that crosses the threshold
    /// still lands in the batch. Zero rotates after every record.
    pub max_bytes: u64,

    /// Rotate once a batch has been open longer than this.
    ///
    /// A duration too large to add to the clock's current instant (such as
    /// `Duration::MAX`) turns time-based rotation off.
    pub duration: Duration,

    /// Append `\n` to every record before writing it.
    pub append_newline: bool,

    /// Time source for batch deadlines.
    pub clock: Arc<dyn Clock>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            duration: DEFAULT_DURATION,
            append_newline: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte threshold.
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the time threshold.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets whether records get a trailing newline.
    #[must_use]
    pub fn append_newline(mut self, value: bool) -> Self {
        self.append_newline = value;
        self
    }

    /// Sets the clock used for deadlines.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
