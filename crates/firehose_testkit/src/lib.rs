//! # Firehose Testkit
//!
//! Test utilities for firehose.
//!
//! This crate provides:
//! - Fixtures: a writer harness, failing destinations, counting suppliers
//! - Property-based test generators using proptest
//! - Concurrent stress helpers
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use firehose_testkit::prelude::*;
//!
//! #[test]
//! fn batches_rotate() {
//!     let harness = TestWriter::new(WriterConfig::new().max_bytes(7));
//!     harness.put_all(&["Niels", "Tisse", "Juna", "Alise"]);
//!     harness.writer.close().unwrap();
//!     assert_eq!(harness.batches(), vec![b"NielsTisse".to_vec(), b"JunaAlise".to_vec()]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
    pub use firehose_core::{
        Clock, CoreError, CoreResult, Destination, DestinationRegistry, DestinationStack,
        MockClock, RecordWriter, Supplier, WriterConfig,
    };
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use stress::*;
