//! Destination factories.

use crate::destination::Destination;
use crate::error::CoreResult;

/// Opens a fresh destination for each batch.
///
/// The record writer calls `supply` once per batch, on the first record
/// after a rotation, while holding its internal lock. Implementations must
/// not call back into the same writer, and must not keep or reuse the
/// destination they return.
///
/// Any `Fn() -> CoreResult<Box<dyn Destination>>` closure is a supplier:
///
/// ```rust
/// use firehose_core::{CoreResult, Destination, MemorySink, SinkDestination, Supplier};
///
/// let supplier = || -> CoreResult<Box<dyn Destination>> {
///     Ok(Box::new(SinkDestination::new(MemorySink::new())))
/// };
/// assert!(supplier.supply().is_ok());
/// ```
pub trait Supplier: Send + Sync {
    /// Opens the destination for a new batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be opened. The writer
    /// passes it to the caller unchanged.
    fn supply(&self) -> CoreResult<Box<dyn Destination>>;
}

impl<F> Supplier for F
where
    F: Fn() -> CoreResult<Box<dyn Destination>> + Send + Sync,
{
    fn supply(&self) -> CoreResult<Box<dyn Destination>> {
        self()
    }
}
