//! Record writer benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use firehose_bench::{generate_records, record_data};
use firehose_core::{DestinationRegistry, RecordWriter, SinkKind, WriterConfig};
use std::sync::Arc;
use std::thread;

/// Benchmark put_record into memory batches.
fn bench_put_record_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_record_memory");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let registry = DestinationRegistry::new();
            let writer = RecordWriter::new(registry.supplier(), WriterConfig::new());
            let data = record_data(size);

            b.iter(|| {
                writer.put_record(black_box(&data)).unwrap();
                // Keep the registry from growing without bound.
                if registry.len() > 64 {
                    registry.clear();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark put_record into temp-file backed batches.
fn bench_put_record_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_record_file");
    group.sample_size(50);

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let registry = DestinationRegistry::new();
            let writer = RecordWriter::new(
                registry.supplier_for(SinkKind::File),
                WriterConfig::new().max_bytes(256 * 1024),
            );
            let data = record_data(size);

            b.iter(|| {
                writer.put_record(black_box(&data)).unwrap();
                if registry.len() > 16 {
                    registry.clear();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark put_record through the gzip stack.
fn bench_put_record_gzip(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_record_gzip");

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let registry = DestinationRegistry::new();
            let writer = RecordWriter::new(registry.gzip_supplier(), WriterConfig::new());
            let data = record_data(size);

            b.iter(|| {
                writer.put_record(black_box(&data)).unwrap();
                if registry.len() > 64 {
                    registry.clear();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark a full stream of small records with frequent rotation.
fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");
    group.sample_size(20);

    let records = generate_records(1000, 64);
    group.throughput(Throughput::Bytes(1000 * 64));

    for max_bytes in [1024u64, 16 * 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_bytes),
            max_bytes,
            |b, &max_bytes| {
                b.iter(|| {
                    let registry = DestinationRegistry::new();
                    let writer = RecordWriter::new(
                        registry.supplier(),
                        WriterConfig::new().max_bytes(max_bytes).append_newline(true),
                    );
                    for record in &records {
                        writer.put_record(black_box(record)).unwrap();
                    }
                    writer.close().unwrap();
                    black_box(registry.len());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark several threads sharing one writer.
fn bench_concurrent_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_put");
    group.sample_size(20);

    for threads in [2usize, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            threads,
            |b, &threads| {
                let data = Arc::new(record_data(128));

                b.iter(|| {
                    let registry = DestinationRegistry::new();
                    let writer = Arc::new(RecordWriter::new(
                        registry.supplier(),
                        WriterConfig::new().max_bytes(64 * 1024),
                    ));

                    let handles: Vec<_> = (0..threads)
                        .map(|_| {
                            let writer = Arc::clone(&writer);
                            let data = Arc::clone(&data);
                            thread::spawn(move || {
                                for _ in 0..250 {
                                    writer.put_record(&data).unwrap();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    writer.close().unwrap();
                    black_box(registry.len());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_put_record_memory,
    bench_put_record_file,
    bench_put_record_gzip,
    bench_rotation,
    bench_concurrent_put,
);

criterion_main!(benches);
