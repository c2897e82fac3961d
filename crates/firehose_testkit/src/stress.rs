//! Concurrent stress helpers.
//!
//! Several threads share one writer through `Arc`; afterwards every record
//! must appear in the published batches exactly once, and each thread's
//! records must keep their relative order.

use firehose_core::{DestinationRegistry, RecordWriter, WriterConfig};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of writer threads.
    pub threads: usize,
    /// Records written by each thread.
    pub records_per_thread: usize,
    /// Byte threshold of the shared writer.
    pub max_bytes: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            records_per_thread: 1_000,
            max_bytes: 4 * 1024,
        }
    }
}

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Records written successfully.
    pub records: usize,
    /// Batches published.
    pub batches: usize,
    /// Records that never showed up in a batch.
    pub missing: usize,
    /// Records that showed up more than once.
    pub duplicated: usize,
    /// Threads whose records came back out of order.
    pub reordered_threads: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Returns true if every record arrived once and in order.
    pub fn is_consistent(&self) -> bool {
        self.missing == 0 && self.duplicated == 0 && self.reordered_threads == 0
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Records: {}", self.records);
        println!("Batches: {}", self.batches);
        println!("Missing: {}", self.missing);
        println!("Duplicated: {}", self.duplicated);
        println!("Reordered threads: {}", self.reordered_threads);
        println!("Duration: {:?}", self.duration);
    }
}

fn record_line(thread: usize, index: usize) -> String {
    format!("{thread:04}:{index:08}")
}

/// Runs `config.threads` threads against one shared newline-delimited writer.
pub fn run_concurrent_writers(config: &StressConfig) -> StressTestResult {
    let registry = DestinationRegistry::new();
    let writer = Arc::new(RecordWriter::new(
        registry.supplier(),
        WriterConfig::new()
            .max_bytes(config.max_bytes)
            .append_newline(true),
    ));

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|thread_id| {
            let writer = Arc::clone(&writer);
            let records = config.records_per_thread;
            thread::spawn(move || {
                for index in 0..records {
                    writer
                        .put_record(record_line(thread_id, index).as_bytes())
                        .expect("Failed to put record");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }
    writer.close().expect("Failed to close writer");
    let duration = start.elapsed();

    verify(&registry, config, duration)
}

fn verify(registry: &DestinationRegistry, config: &StressConfig, duration: Duration) -> StressTestResult {
    let mut batches: Vec<(u64, Vec<u8>)> = registry
        .snapshot()
        .into_iter()
        .map(|(name, bytes)| (u64::from_str_radix(&name, 16).unwrap_or(u64::MAX), bytes))
        .collect();
    batches.sort_by_key(|(sequence, _)| *sequence);

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut last_index: HashMap<usize, usize> = HashMap::new();
    let mut reordered = HashSet::new();

    for (_, bytes) in &batches {
        let text = String::from_utf8_lossy(bytes);
        for line in text.lines() {
            *seen.entry(line.to_string()).or_insert(0) += 1;

            let Some((thread, index)) = line.split_once(':') else {
                continue;
            };
            let (Ok(thread), Ok(index)) = (thread.parse::<usize>(), index.parse::<usize>()) else {
                continue;
            };
            if let Some(previous) = last_index.insert(thread, index) {
                if previous >= index {
                    reordered.insert(thread);
                }
            }
        }
    }

    let mut missing = 0;
    for thread in 0..config.threads {
        for index in 0..config.records_per_thread {
            if !seen.contains_key(&record_line(thread, index)) {
                missing += 1;
            }
        }
    }

    StressTestResult {
        records: seen.values().sum(),
        batches: batches.len(),
        missing,
        duplicated: seen.values().filter(|count| **count > 1).count(),
        reordered_threads: reordered.len(),
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_concurrent_run_is_consistent() {
        let config = StressConfig {
            threads: 4,
            records_per_thread: 200,
            max_bytes: 512,
        };
        let result = run_concurrent_writers(&config);

        assert!(result.is_consistent(), "{result:?}");
        assert_eq!(result.records, 800);
        assert!(result.batches > 1);
    }
}
