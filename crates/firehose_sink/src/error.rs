//! Error types for sink operations.

use std::io;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur during sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sink has already been closed.
    #[error("sink is closed")]
    Closed,
}

impl SinkError {
    /// Converts this error into an [`io::Error`] for use inside `Write` impls.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            SinkError::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}
