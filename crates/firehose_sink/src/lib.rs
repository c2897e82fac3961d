//! # Firehose Sink
//!
//! Accumulating byte sinks for firehose batches.
//!
//! A sink is an **opaque byte store**: it accepts writes, can hand back
//! everything written so far, and is closed exactly once when the batch it
//! holds is done. Sinks do not interpret the records they carry.
//!
//! ## Available Sinks
//!
//! - [`MemorySink`] - Buffers in process memory
//! - [`FileSink`] - Spools to a temporary file that is deleted on close
//!
//! Both satisfy [`ByteSink`], so callers can pick one at runtime via
//! [`SinkKind`] without the code above them knowing the difference.
//!
//! ## Example
//!
//! ```rust
//! use firehose_sink::{ByteSink, MemorySink};
//! use std::io::Write;
//!
//! let mut sink = MemorySink::new();
//! sink.write_all(b"hello world").unwrap();
//! assert_eq!(sink.bytes().unwrap(), b"hello world");
//! sink.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod sink;

pub use error::{SinkError, SinkResult};
pub use file::FileSink;
pub use memory::MemorySink;
pub use sink::{ByteSink, SinkKind};
