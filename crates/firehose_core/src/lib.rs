//! # Firehose Core
//!
//! Batched, threshold-triggered record writer.
//!
//! This crate provides:
//! - [`RecordWriter`], which groups records into batches and rotates the
//!   batch destination when a byte or time threshold is crossed
//! - [`Destination`] and [`DestinationStack`] for layering transforms
//!   (such as gzip) over a raw sink
//! - [`Supplier`], the factory that opens a destination per batch
//! - [`Clock`] implementations for real and deterministic time
//! - [`DestinationRegistry`], an in-memory publish target for batches
//!
//! ## Example
//!
//! ```rust
//! use firehose_core::{DestinationRegistry, RecordWriter, WriterConfig};
//!
//! let registry = DestinationRegistry::new();
//! let writer = RecordWriter::new(registry.supplier(), WriterConfig::new().max_bytes(7));
//!
//! for record in ["Niels", "Tisse", "Juna", "Alise"] {
//!     writer.put_record(record.as_bytes()).unwrap();
//! }
//! writer.close().unwrap();
//!
//! assert_eq!(registry.get("1").unwrap(), b"NielsTisse");
//! assert_eq!(registry.get("2").unwrap(), b"JunaAlise");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod destination;
mod error;
mod registry;
mod stack;
mod stats;
mod supplier;
mod writer;

pub use clock::{Clock, MockClock, SystemClock};
pub use config::{WriterConfig, DEFAULT_DURATION, DEFAULT_MAX_BYTES};
pub use destination::{Destination, SinkDestination};
pub use error::{CoreError, CoreResult};
pub use registry::{DestinationRegistry, MemoryDestination, RegisteredDestination};
pub use stack::{DestinationStack, StackHandle};
pub use stats::{StatsSnapshot, WriterStats};
pub use supplier::Supplier;
pub use writer::RecordWriter;

pub use firehose_sink::{ByteSink, FileSink, MemorySink, SinkError, SinkKind};
