//! Error types for firehose core.

use firehose_sink::SinkError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while writing batches.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error from a destination.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Sink error.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// The supplier could not open a destination for a new batch.
    #[error("supplier failed: {message}")]
    Supplier {
        /// Description of the failure.
        message: String,
    },

    /// A compression layer failed to finish its stream.
    #[error("compression error: {message}")]
    Compression {
        /// Description of the failure.
        message: String,
    },

    /// Several layers of a destination stack failed to close.
    ///
    /// Failures are listed in the order they occurred (outermost layer first).
    #[error("{} close failures: {}", .0.len(), join_messages(.0))]
    Close(Vec<CoreError>),
}

fn join_messages(errors: &[CoreError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    /// Creates a supplier error.
    pub fn supplier(message: impl Into<String>) -> Self {
        Self::Supplier {
            message: message.into(),
        }
    }

    /// Creates a compression error.
    pub fn compression(message: impl Into<String>) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Combines collected failures into one result.
    ///
    /// No failures yields `Ok(())`, a single failure is returned as is, and
    /// more than one is wrapped in [`CoreError::Close`].
    pub fn join(mut errors: Vec<CoreError>) -> CoreResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(CoreError::Close(errors)),
        }
    }

    /// Returns the individual failures carried by this error.
    ///
    /// For anything but [`CoreError::Close`] this is the error itself.
    #[must_use]
    pub fn failures(&self) -> Vec<&CoreError> {
        match self {
            CoreError::Close(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_empty_is_ok() {
        assert!(CoreError::join(Vec::new()).is_ok());
    }

    #[test]
    fn join_single_is_unwrapped() {
        let err = CoreError::join(vec![CoreError::supplier("boom")]).unwrap_err();
        assert!(matches!(err, CoreError::Supplier { .. }));
        assert_eq!(err.failures().len(), 1);
    }

    #[test]
    fn join_many_lists_every_failure() {
        let err = CoreError::join(vec![
            CoreError::compression("trailer"),
            CoreError::supplier("inner"),
        ])
        .unwrap_err();

        assert_eq!(err.failures().len(), 2);
        let message = err.to_string();
        assert!(message.starts_with("2 close failures"));
        assert!(message.contains("compression error: trailer"));
        assert!(message.contains("supplier failed: inner"));
    }

    #[test]
    fn sink_error_converts() {
        let err: CoreError = SinkError::Closed.into();
        assert_eq!(err.to_string(), "sink error: sink is closed");
    }
}
