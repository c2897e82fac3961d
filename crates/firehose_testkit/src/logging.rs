//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_TEST_FILTER: &str = "warn";

/// Installs a `tracing` subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_TEST_FILTER`]. Safe to call
/// from every test: only the first call installs anything.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
