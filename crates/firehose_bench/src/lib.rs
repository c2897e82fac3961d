//! Benchmark utilities.

/// Generates a record of `size` bytes with a repeating byte pattern.
pub fn record_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Generates `count` records of `size` bytes each.
pub fn generate_records(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| record_data(size)).collect()
}
